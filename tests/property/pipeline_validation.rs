// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Pipeline Validation
//!
//! Pipelines are generated as chains where each stage consumes the output
//! of the stage before it, then mutated to break exactly one rule.

use genai_infra::pipeline::{define_pipeline, Action, ActionKind, PipelineError, Stage};
use genai_infra::state_machine::PipelineStatus;
use proptest::prelude::*;

/// A valid chain: stage `i` has `width[i]` actions, all reading `artifact{i-1}`
fn chain(widths: &[usize]) -> Vec<Stage> {
    widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            (0..width).fold(Stage::new(format!("Stage{i}")), |stage, a| {
                let mut action = Action::new(format!("Action{i}_{a}"), ActionKind::Build);
                if i > 0 {
                    action = action.input(format!("artifact{}", i - 1));
                }
                if a == 0 {
                    action = action.output(format!("artifact{i}"));
                }
                stage.action(action)
            })
        })
        .collect()
}

fn widths() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..4, 1..8)
}

proptest! {
    /// Property: well-formed chains validate and schedule in declared order
    #[test]
    fn prop_chain_validates(widths in widths()) {
        let mut pipeline = define_pipeline("Chain", chain(&widths));
        prop_assert!(pipeline.validate().is_ok());
        prop_assert_eq!(pipeline.status(), PipelineStatus::Validated);

        let schedule = pipeline.execute().unwrap();
        let stages: Vec<String> = schedule.batches.iter().map(|b| b.stage.clone()).collect();
        let expected: Vec<String> = (0..widths.len()).map(|i| format!("Stage{i}")).collect();
        prop_assert_eq!(stages, expected);
        for (batch, &width) in schedule.batches.iter().zip(&widths) {
            prop_assert_eq!(batch.actions.len(), width);
        }
    }

    /// Property: consuming an artifact from a later stage is dangling
    #[test]
    fn prop_forward_reference_is_dangling(
        widths in widths(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut stages = chain(&widths);
        let target = pick.index(stages.len());
        let future = format!("artifact{}", target);
        stages[target].actions[0].inputs.push(future.clone());

        let mut pipeline = define_pipeline("Chain", stages);
        let result = pipeline.validate();
        let dangling = matches!(
            result,
            Err(PipelineError::DanglingArtifact { ref artifact, .. }) if *artifact == future
        );
        prop_assert!(dangling, "Same-stage output must not satisfy an input");
        prop_assert_eq!(pipeline.status(), PipelineStatus::Draft);
    }

    /// Property: amending a validated pipeline sends it back to draft
    #[test]
    fn prop_amend_requires_revalidation(widths in widths()) {
        let mut pipeline = define_pipeline("Chain", chain(&widths));
        pipeline.validate().unwrap();

        let next = widths.len();
        pipeline
            .add_stage(Stage::new(format!("Stage{next}")).action(
                Action::new("Extra", ActionKind::Deploy).input(format!("artifact{}", next - 1)),
            ))
            .unwrap();
        prop_assert_eq!(pipeline.status(), PipelineStatus::Draft);
        let not_validated = matches!(pipeline.execute(), Err(PipelineError::NotValidated(_)));
        prop_assert!(not_validated);

        prop_assert!(pipeline.validate().is_ok());
        prop_assert!(pipeline.execute().is_ok());
    }
}
