use std::sync::atomic::Ordering;

use super::*;
use crate::{
    error::MeridianError,
    testing::{plan, step, JoiningFinalizer, MapExecutor, QueueChooser},
};

fn scheduler(plans: &[crate::models::Plan], config: SchedulerConfig) -> StepScheduler {
    StepScheduler::new("q", PlanGraph::from_plans(plans), config)
}

fn executed_goals(outcome: &RunOutcome) -> Vec<&str> {
    outcome.steps.iter().map(|s| s.step.goal.as_str()).collect()
}

#[tokio::test]
async fn test_linear_plan_runs_without_choice_calls() {
    let mut scheduler = scheduler(&[plan(&[1, 2, 3])], SchedulerConfig::default());
    let chooser = QueueChooser::new(vec![]);
    let executor = MapExecutor::default();
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler.run(&chooser, &executor, &finalizer).await.unwrap();

    assert_eq!(chooser.call_count(), 0);
    assert_eq!(executed_goals(&outcome), vec!["Goal 1", "Goal 2", "Goal 3"]);
    assert_eq!(outcome.termination, Termination::Finalized);
    assert_eq!(outcome.final_answer, "Goal 1,Goal 2,Goal 3");
    assert_eq!(scheduler.graph().final_answer(), Some("Goal 1,Goal 2,Goal 3"));
    // each step saw every earlier result as context
    assert_eq!(*executor.context_sizes.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_branching_frontier_consults_chooser() {
    let mut scheduler = scheduler(
        &[plan(&[1, 2, 4]), plan(&[1, 3, 5])],
        SchedulerConfig::default(),
    );
    let chooser = QueueChooser::new(vec![Choice::Index(1)]);
    let executor = MapExecutor::default();
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler.run(&chooser, &executor, &finalizer).await.unwrap();

    // [2, 3] picks 3, [2, 5] picks 2, [4, 5] picks 4, then END shows up beside 5
    let seen = chooser.seen.lock().unwrap().clone();
    assert_eq!(seen[0], vec![step(2), step(3)]);
    assert_eq!(executed_goals(&outcome)[..2], ["Goal 1", "Goal 3"]);
    assert_eq!(outcome.termination, Termination::Finalized);
}

#[tokio::test]
async fn test_end_beside_pending_steps_finalizes() {
    // the short plan reaches END while the long branch is still pending
    let mut scheduler = scheduler(&[plan(&[1]), plan(&[2, 3])], SchedulerConfig::default());
    let chooser = QueueChooser::new(vec![Choice::Index(0)]);
    let executor = MapExecutor::default();
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler.run(&chooser, &executor, &finalizer).await.unwrap();

    assert_eq!(executed_goals(&outcome), vec!["Goal 1"]);
    assert_eq!(outcome.final_answer, "Goal 1");
    assert_eq!(finalizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_choice_skips_every_candidate() {
    let mut scheduler = scheduler(&[plan(&[1, 2]), plan(&[3, 4])], SchedulerConfig::default());
    // select_next does not record anything, so the run sees the same frontier
    let chooser = QueueChooser::new(vec![Choice::NoChoice, Choice::NoChoice]);
    let executor = MapExecutor::default();
    let finalizer = JoiningFinalizer::default();

    let selection = scheduler.select_next(&chooser).await.unwrap();
    let (s1, s3) = (
        scheduler.graph().exist_step(&step(1)).unwrap(),
        scheduler.graph().exist_step(&step(3)).unwrap(),
    );
    assert_eq!(selection, Selection::Skip(vec![s1, s3]));

    let outcome = scheduler.run(&chooser, &executor, &finalizer).await.unwrap();
    let skipped: Vec<_> = outcome
        .steps
        .iter()
        .filter(|s| s.status == OutcomeStatus::Skipped)
        .map(|s| s.step.goal.as_str())
        .collect();
    assert_eq!(skipped, vec!["Goal 1", "Goal 3"]);

    let node = scheduler.graph().node(s1).unwrap();
    assert_eq!(node.result(), Some(SKIPPED_RESULT));
}

#[tokio::test]
async fn test_out_of_range_choice_counts_as_no_choice() {
    let scheduler = scheduler(&[plan(&[1, 2]), plan(&[3, 4])], SchedulerConfig::default());
    let chooser = QueueChooser::new(vec![Choice::Index(2)]);

    let selection = scheduler.select_next(&chooser).await.unwrap();
    assert!(matches!(selection, Selection::Skip(ref ids) if ids.len() == 2));
}

#[tokio::test]
async fn test_early_answer_stops_the_run() {
    let mut scheduler = scheduler(&[plan(&[1, 2, 3])], SchedulerConfig::default());
    let chooser = QueueChooser::new(vec![]);
    let executor =
        MapExecutor::default().with_override("Goal 2", "Looked it up. Final answer:  Paris ");
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler.run(&chooser, &executor, &finalizer).await.unwrap();

    assert_eq!(outcome.termination, Termination::EarlyAnswer);
    assert_eq!(outcome.final_answer, "Paris");
    assert_eq!(finalizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    // the step result itself is still recorded
    let s2 = scheduler.graph().exist_step(&step(2)).unwrap();
    assert!(scheduler.graph().node(s2).unwrap().is_resolved());
}

#[tokio::test]
async fn test_disabled_marker_ignores_answers_in_results() {
    let config = SchedulerConfig {
        final_answer_marker: None,
        ..SchedulerConfig::default()
    };
    let mut scheduler = scheduler(&[plan(&[1, 2])], config);
    let executor = MapExecutor::default().with_override("Goal 1", "Final answer: 42");

    let outcome = scheduler
        .run(
            &QueueChooser::new(vec![]),
            &executor,
            &JoiningFinalizer::default(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.termination, Termination::Finalized);
    assert_eq!(outcome.final_answer, "Goal 1,Goal 2");
}

#[tokio::test]
async fn test_step_cap_forces_finalize() {
    let config = SchedulerConfig {
        max_execution_steps: Some(2),
        ..SchedulerConfig::default()
    };
    let mut scheduler = scheduler(&[plan(&[1, 2, 3, 4])], config);
    let executor = MapExecutor::default();
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler
        .run(&QueueChooser::new(vec![]), &executor, &finalizer)
        .await
        .unwrap();

    assert_eq!(outcome.termination, Termination::StepBudgetExhausted);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.final_answer, "Goal 1,Goal 2");
}

#[tokio::test]
async fn test_unreachable_end_finalizes_on_empty_frontier() {
    let mut scheduler = scheduler(&[], SchedulerConfig::default());
    let finalizer = JoiningFinalizer::default();

    let outcome = scheduler
        .run(
            &QueueChooser::new(vec![]),
            &MapExecutor::default(),
            &finalizer,
        )
        .await
        .unwrap();

    assert_eq!(outcome.termination, Termination::FrontierExhausted);
    assert!(outcome.steps.is_empty());
    assert_eq!(scheduler.graph().final_answer(), Some(""));
}

#[tokio::test]
async fn test_executor_failure_propagates() {
    struct Failing;

    #[async_trait::async_trait]
    impl StepExecutor for Failing {
        async fn execute(
            &self,
            _question: &str,
            _step: &Step,
            _completed: &[crate::models::CompletedStep],
        ) -> Result<String> {
            Err(MeridianError::collaborator("step executor", "search timed out"))
        }
    }

    let mut scheduler = scheduler(&[plan(&[1])], SchedulerConfig::default());
    let err = scheduler
        .run(
            &QueueChooser::new(vec![]),
            &Failing,
            &JoiningFinalizer::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MeridianError::Collaborator { role: "step executor", .. }));
}

#[tokio::test]
async fn test_unknown_node_is_not_dispatched() {
    let other = PlanGraph::from_plans(&[plan(&[1, 2, 3, 4])]);
    let foreign = other.exist_step(&step(4)).unwrap();

    let mut scheduler = scheduler(&[plan(&[1])], SchedulerConfig::default());
    let executor = MapExecutor::default();

    let err = scheduler.dispatch(foreign, &executor).await.unwrap_err();
    assert!(matches!(err, MeridianError::InvalidInput { .. }));
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);

    let err = scheduler.skip(&[foreign]).unwrap_err();
    assert!(matches!(err, MeridianError::InvalidInput { .. }));
    assert!(scheduler.graph().current_exec_results().is_empty());
}
