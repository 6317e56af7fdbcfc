// Copyright (c) 2025 - Cowboy AI, Inc.
//! Release Pipeline Stage Sequencer
//!
//! A pipeline is an ordered list of stages. Stages run strictly in
//! declared order, a stage must fully succeed before the next one starts,
//! and the actions of one stage may run in parallel.
//!
//! Because actions inside a stage are concurrent, an artifact produced in
//! stage N is visible from stage N+1 onward only. Validation enforces this
//! before a pipeline can be scheduled:
//!
//! ```text
//! Source  ──SourceArtifact──▶  Build  ──BuildArtifact──▶  Deploy
//! ```
//!
//! Lifecycle is tracked by the [`PipelineStatus`] state machine:
//! `Draft → Validated`, and any amendment drops back to `Draft`.

pub mod stage;

pub use stage::{Action, ActionKind, Stage};

use chrono::Utc;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::state_machine::{
    LifecycleOutput, PipelineCommand, PipelineStatus, StateMachineWithHistory, Transition,
};

/// Pipeline definition and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Pipeline {pipeline}: action {action} in stage {stage} consumes artifact {artifact} that no earlier stage produces")]
    DanglingArtifact {
        pipeline: String,
        stage: String,
        action: String,
        artifact: String,
    },

    #[error("Pipeline {0} has no stages")]
    EmptyPipeline(String),

    #[error("Pipeline {pipeline}: stage {stage} has no actions")]
    EmptyStage { pipeline: String, stage: String },

    #[error("Pipeline {pipeline}: duplicate stage {stage}")]
    DuplicateStage { pipeline: String, stage: String },

    #[error("Pipeline {pipeline}: artifact {artifact} produced by both {first} and {second}")]
    DuplicateArtifact {
        pipeline: String,
        artifact: String,
        first: String,
        second: String,
    },

    #[error("Pipeline {0} must be validated before execution")]
    NotValidated(String),
}

/// Define a pipeline in the `Draft` state
pub fn define_pipeline(name: impl Into<String>, stages: Vec<Stage>) -> Pipeline {
    Pipeline::new(name, stages)
}

/// An ordered sequence of stages with a tracked lifecycle
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<Stage>,
    lifecycle: StateMachineWithHistory<PipelineStatus>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
            lifecycle: StateMachineWithHistory::new(PipelineStatus::Draft),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn status(&self) -> PipelineStatus {
        *self.lifecycle.current_state()
    }

    pub fn is_validated(&self) -> bool {
        self.status() == PipelineStatus::Validated
    }

    /// Lifecycle transitions in the order they happened
    pub fn history(&self) -> &[Transition<PipelineStatus, PipelineCommand>] {
        self.lifecycle.history()
    }

    /// Append a stage; a validated pipeline returns to `Draft`
    pub fn add_stage(&mut self, stage: Stage) -> Result<LifecycleOutput, PipelineError> {
        let output = self.apply(PipelineCommand::Amend)?;
        debug!(pipeline = %self.name, stage = %stage.name, "Stage added");
        self.stages.push(stage);
        Ok(output)
    }

    /// Check the artifact flow and move to `Validated`
    ///
    /// On error the pipeline stays in its current state. Lifecycle warnings
    /// are logged and returned.
    pub fn validate(&mut self) -> Result<LifecycleOutput, PipelineError> {
        self.check()?;
        let output = self.apply(PipelineCommand::Validate)?;
        info!(pipeline = %self.name, stages = self.stages.len(), "Pipeline validated");
        Ok(output)
    }

    fn apply(&mut self, command: PipelineCommand) -> Result<LifecycleOutput, PipelineError> {
        // the lifecycle only rejects Execute from Draft
        let output = self
            .lifecycle
            .transition_with_history(command, Utc::now())
            .map_err(|_| PipelineError::NotValidated(self.name.clone()))?;
        for warning in &output.warnings {
            warn!(pipeline = %self.name, ?command, %warning, "Pipeline lifecycle warning");
        }
        Ok(output)
    }

    fn check(&self) -> Result<(), PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::EmptyPipeline(self.name.clone()));
        }

        let mut stage_names = HashSet::new();
        // artifact -> producing action, for stages strictly before the current one
        let mut produced: HashMap<&str, &str> = HashMap::new();

        for stage in &self.stages {
            if !stage_names.insert(stage.name.as_str()) {
                return Err(PipelineError::DuplicateStage {
                    pipeline: self.name.clone(),
                    stage: stage.name.clone(),
                });
            }
            if stage.actions.is_empty() {
                return Err(PipelineError::EmptyStage {
                    pipeline: self.name.clone(),
                    stage: stage.name.clone(),
                });
            }

            for action in &stage.actions {
                if let Some(artifact) = action
                    .inputs
                    .iter()
                    .find(|input| !produced.contains_key(input.as_str()))
                {
                    return Err(PipelineError::DanglingArtifact {
                        pipeline: self.name.clone(),
                        stage: stage.name.clone(),
                        action: action.name.clone(),
                        artifact: artifact.clone(),
                    });
                }
            }

            let mut stage_outputs: HashMap<&str, &str> = HashMap::new();
            for action in &stage.actions {
                for output in &action.outputs {
                    let previous = produced
                        .get(output.as_str())
                        .or_else(|| stage_outputs.get(output.as_str()));
                    if let Some(first) = previous {
                        return Err(PipelineError::DuplicateArtifact {
                            pipeline: self.name.clone(),
                            artifact: output.clone(),
                            first: first.to_string(),
                            second: action.name.clone(),
                        });
                    }
                    stage_outputs.insert(output.as_str(), action.name.as_str());
                }
            }
            produced.extend(stage_outputs);
        }

        Ok(())
    }

    /// Produce the execution schedule
    ///
    /// Only a validated pipeline can be scheduled. Actual execution is
    /// delegated to the hosting platform; the schedule is the contract.
    pub fn execute(&mut self) -> Result<ExecutionSchedule, PipelineError> {
        self.apply(PipelineCommand::Execute)?;
        Ok(self.schedule())
    }

    fn schedule(&self) -> ExecutionSchedule {
        ExecutionSchedule {
            pipeline: self.name.clone(),
            batches: self
                .stages
                .iter()
                .map(|stage| ExecutionBatch {
                    stage: stage.name.clone(),
                    actions: stage.actions.iter().map(|a| a.name.clone()).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct PipelineRecord<'a> {
    name: &'a str,
    status: PipelineStatus,
    stages: &'a [Stage],
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PipelineRecord {
            name: &self.name,
            status: self.status(),
            stages: &self.stages,
        }
        .serialize(serializer)
    }
}

/// Stage-ordered batches of logically concurrent actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSchedule {
    pub pipeline: String,
    pub batches: Vec<ExecutionBatch>,
}

/// One stage worth of actions; every action must succeed before the next batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionBatch {
    pub stage: String,
    pub actions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn release_stages() -> Vec<Stage> {
        vec![
            Stage::new("Source").action(
                Action::new("Source", ActionKind::Source).output("SourceArtifact"),
            ),
            Stage::new("Build").action(
                Action::new("Build", ActionKind::Build)
                    .input("SourceArtifact")
                    .output("BuildArtifact"),
            ),
            Stage::new("Deploy")
                .action(Action::new("Deploy", ActionKind::Deploy).input("BuildArtifact")),
        ]
    }

    #[test]
    fn test_valid_pipeline() {
        let mut pipeline = define_pipeline("BackendAppPipeline", release_stages());
        assert_eq!(pipeline.status(), PipelineStatus::Draft);

        pipeline.validate().unwrap();
        assert_eq!(pipeline.status(), PipelineStatus::Validated);
        assert_eq!(pipeline.history().len(), 1);
    }

    #[test]
    fn test_same_stage_production_is_dangling() {
        let mut pipeline = define_pipeline(
            "p",
            vec![Stage::new("BuildAndTest")
                .action(Action::new("Build", ActionKind::Build).output("BuildArtifact"))
                .action(Action::new("Deploy", ActionKind::Deploy).input("BuildArtifact"))],
        );

        assert_eq!(
            pipeline.validate(),
            Err(PipelineError::DanglingArtifact {
                pipeline: "p".into(),
                stage: "BuildAndTest".into(),
                action: "Deploy".into(),
                artifact: "BuildArtifact".into(),
            })
        );
        assert_eq!(pipeline.status(), PipelineStatus::Draft);
        assert!(pipeline.history().is_empty());
    }

    #[test]
    fn test_empty_pipeline_and_stage() {
        let mut empty = define_pipeline("p", vec![]);
        assert_eq!(empty.validate(), Err(PipelineError::EmptyPipeline("p".into())));

        let mut hollow = define_pipeline("p", vec![Stage::new("Source")]);
        assert!(matches!(
            hollow.validate(),
            Err(PipelineError::EmptyStage { stage, .. }) if stage == "Source"
        ));
    }

    #[test]
    fn test_duplicate_stage_and_artifact() {
        let mut stages = release_stages();
        stages.push(Stage::new("Build").action(Action::new("Again", ActionKind::Build)));
        let mut pipeline = define_pipeline("p", stages);
        assert!(matches!(
            pipeline.validate(),
            Err(PipelineError::DuplicateStage { .. })
        ));

        let mut stages = release_stages();
        stages.push(
            Stage::new("Rebuild")
                .action(Action::new("Rebuild", ActionKind::Build).output("BuildArtifact")),
        );
        let mut pipeline = define_pipeline("p", stages);
        assert_eq!(
            pipeline.validate(),
            Err(PipelineError::DuplicateArtifact {
                pipeline: "p".into(),
                artifact: "BuildArtifact".into(),
                first: "Build".into(),
                second: "Rebuild".into(),
            })
        );
    }

    #[test]
    fn test_execute_requires_validation() {
        let mut pipeline = define_pipeline("p", release_stages());
        assert_eq!(
            pipeline.execute(),
            Err(PipelineError::NotValidated("p".into()))
        );

        pipeline.validate().unwrap();
        let schedule = pipeline.execute().unwrap();
        assert_eq!(
            schedule
                .batches
                .iter()
                .map(|b| b.stage.as_str())
                .collect::<Vec<_>>(),
            vec!["Source", "Build", "Deploy"]
        );
    }

    #[test]
    fn test_amend_returns_to_draft() {
        let mut pipeline = define_pipeline("p", release_stages());
        pipeline.validate().unwrap();

        pipeline
            .add_stage(Stage::new("Verify").action(
                Action::new("Smoke", ActionKind::Deploy).input("BuildArtifact"),
            ))
            .unwrap();

        assert_eq!(pipeline.status(), PipelineStatus::Draft);
        assert!(pipeline.execute().is_err());
        pipeline.validate().unwrap();
        assert_eq!(pipeline.history().len(), 3);
    }

    #[test]
    fn test_lifecycle_warnings_surface() {
        let mut pipeline = define_pipeline("p", release_stages());
        assert!(pipeline.validate().unwrap().warnings.is_empty());

        let again = pipeline.validate().unwrap();
        assert_eq!(again.warnings, vec!["Pipeline already validated".to_string()]);
        assert_eq!(pipeline.status(), PipelineStatus::Validated);

        let amended = pipeline
            .add_stage(Stage::new("Verify").action(
                Action::new("Smoke", ActionKind::Deploy).input("BuildArtifact"),
            ))
            .unwrap();
        assert_eq!(
            amended.warnings,
            vec!["Validation invalidated by amendment".to_string()]
        );

        let draft_amend = pipeline
            .add_stage(Stage::new("Report").action(Action::new("Notify", ActionKind::Deploy)))
            .unwrap();
        assert!(draft_amend.warnings.is_empty());
    }

    #[test]
    fn test_rejected_execute_leaves_no_history() {
        let mut pipeline = define_pipeline("p", release_stages());
        assert_eq!(
            pipeline.execute(),
            Err(PipelineError::NotValidated("p".into()))
        );
        assert!(pipeline.history().is_empty());
        assert_eq!(pipeline.status(), PipelineStatus::Draft);
    }

    #[test]
    fn test_serialization_includes_status() {
        let mut pipeline = define_pipeline("p", release_stages());
        pipeline.validate().unwrap();
        let json = serde_json::to_value(&pipeline).unwrap();
        assert_eq!(json["status"], "VALIDATED");
        assert_eq!(json["stages"][1]["actions"][0]["inputs"][0], "SourceArtifact");
    }
}
