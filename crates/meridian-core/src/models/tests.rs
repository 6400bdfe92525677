use std::str::FromStr;

use crate::models::{ActionType, Modification, Plan, PlanScore, Step, Termination};

fn step(n: u32) -> Step {
    Step::new(format!("Goal {n}"), format!("Instructions {n}"))
}

fn two_step_plan() -> Plan {
    Plan::new(vec![step(1), step(2)])
}

#[test]
fn test_steps_compare_by_value() {
    assert_eq!(step(1), Step::new("Goal 1", "Instructions 1"));
    assert_ne!(step(1), Step::new("Goal 1", "Other instructions"));
}

#[test]
fn test_apply_no_modifications_returns_copy() {
    let plan = two_step_plan();
    let copy = plan.apply_modifications(&[]);
    assert_eq!(copy, plan);
}

#[test]
fn test_remove_out_of_range_is_ignored() {
    let plan = two_step_plan();
    let result = plan.apply_modifications(&[Modification::remove(99)]);
    assert_eq!(result.steps, plan.steps);

    let result = plan.apply_modifications(&[Modification::remove(-1)]);
    assert_eq!(result.steps, plan.steps);
}

#[test]
fn test_update_out_of_range_is_ignored() {
    let plan = two_step_plan();
    let result = plan.apply_modifications(&[Modification::update(2, step(9))]);
    assert_eq!(result, plan);
}

#[test]
fn test_modifications_apply_in_sequence() {
    let plan = two_step_plan();
    let result = plan.apply_modifications(&[
        Modification::add(1, step(3)),
        Modification::remove(0),
        Modification::update(1, step(4)),
    ]);
    // [1,2] -> [1,3,2] -> [3,2] -> [3,4]
    assert_eq!(result.steps, vec![step(3), step(4)]);
    // the source plan is untouched
    assert_eq!(plan, two_step_plan());
}

#[test]
fn test_add_past_end_appends() {
    let result = two_step_plan().apply_modifications(&[Modification::add(10, step(3))]);
    assert_eq!(result.steps, vec![step(1), step(2), step(3)]);
}

#[test]
fn test_add_negative_position_counts_from_end() {
    let result = two_step_plan().apply_modifications(&[Modification::add(-1, step(3))]);
    assert_eq!(result.steps, vec![step(1), step(3), step(2)]);

    let result = two_step_plan().apply_modifications(&[Modification::add(-10, step(3))]);
    assert_eq!(result.steps, vec![step(3), step(1), step(2)]);
}

#[test]
fn test_keep_changes_nothing() {
    let plan = two_step_plan();
    assert_eq!(plan.apply_modifications(&[Modification::keep()]), plan);
}

#[test]
fn test_add_with_missing_fields_uses_empty_strings() {
    let json = r#"{"rationale": "r", "action": "add", "action_params": {"position": 0}}"#;
    let modification: Modification = serde_json::from_str(json).unwrap();
    let result = Plan::default().apply_modifications(&[modification]);
    assert_eq!(result.steps, vec![Step::new("", "")]);
}

#[test]
fn test_modification_json_shape() {
    let modification = Modification::add(1, step(5)).with_rationale("needs more detail");
    let value = serde_json::to_value(&modification).unwrap();
    assert_eq!(value["action"], "add");
    assert_eq!(value["rationale"], "needs more detail");
    assert_eq!(value["action_params"]["position"], 1);
    assert_eq!(value["action_params"]["goal"], "Goal 5");
}

#[test]
fn test_action_type_from_str() {
    assert_eq!(ActionType::from_str("ADD").unwrap(), ActionType::Add);
    assert_eq!(ActionType::from_str(" keep ").unwrap(), ActionType::Keep);
    assert!(ActionType::from_str("delete").is_err());
}

#[test]
fn test_plan_score_total_and_bounds() {
    let score = PlanScore::new(3, 2, 1).unwrap();
    assert_eq!(score.total(), 6);

    assert!(PlanScore::new(0, 2, 2).is_err());
    assert!(PlanScore::new(2, 4, 2).is_err());

    let unchecked: PlanScore =
        serde_json::from_str(r#"{"effectiveness": 3, "completeness": 3, "executability": 7}"#)
            .unwrap();
    let err = unchecked.validate().unwrap_err();
    assert!(err.to_string().contains("executability"));
}

#[test]
fn test_termination_round_trips_through_str() {
    for termination in [
        Termination::Finalized,
        Termination::EarlyAnswer,
        Termination::StepBudgetExhausted,
        Termination::FrontierExhausted,
    ] {
        assert_eq!(Termination::from_str(termination.as_str()), Ok(termination));
    }
}
