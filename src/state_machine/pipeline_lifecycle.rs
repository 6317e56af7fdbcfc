// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Pipeline Lifecycle State Machine
//!
//! # States
//!
//! - Draft: declared, not yet checked
//! - Validated: artifact flow checked; ready for (external) execution
//!
//! # Inputs
//!
//! - Validate: Draft → Validated
//! - Amend: any → Draft (stages changed, must be re-validated)
//! - Execute: Validated → Validated (hand-off to the external executor)
//!
//! Execution itself is delegated, so there is no Running/Failed state and
//! no retry loop here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

/// Pipeline lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    Draft,
    Validated,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("DRAFT"),
            Self::Validated => f.write_str("VALIDATED"),
        }
    }
}

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCommand {
    Validate,
    Amend,
    Execute,
}

/// Transition output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleOutput {
    pub warnings: Vec<String>,
}

impl LifecycleOutput {
    fn ok() -> Self {
        Self::default()
    }

    fn warning(message: &str) -> Self {
        Self {
            warnings: vec![message.to_string()],
        }
    }
}

impl StateMachine for PipelineStatus {
    type Input = PipelineCommand;
    type Output = LifecycleOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use PipelineCommand::*;
        use PipelineStatus::*;

        match (self, input) {
            (Draft, Validate) => Ok((Validated, LifecycleOutput::ok())),
            (Validated, Validate) => Ok((
                Validated,
                LifecycleOutput::warning("Pipeline already validated"),
            )),

            (Draft, Amend) => Ok((Draft, LifecycleOutput::ok())),
            (Validated, Amend) => Ok((
                Draft,
                LifecycleOutput::warning("Validation invalidated by amendment"),
            )),

            (Validated, Execute) => Ok((Validated, LifecycleOutput::ok())),
            (Draft, Execute) => Err(TransitionError::InvalidTransition {
                from: Draft.to_string(),
                to: "execution".to_string(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        match self {
            Self::Draft => vec![PipelineCommand::Validate, PipelineCommand::Amend],
            Self::Validated => vec![
                PipelineCommand::Validate,
                PipelineCommand::Amend,
                PipelineCommand::Execute,
            ],
        }
    }
}
