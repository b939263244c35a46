//! Property-based tests for the approval chain.
//!
//! These validate the system-step ordering invariant across arbitrary
//! mutation sequences, and the no-op guarantees of `move_step`.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::roles::RoleRegistry;
use crate::workflow::chain::WorkflowChain;
use crate::workflow::types::{MoveDirection, NewStepSpec, StepCondition, StepUpdate};

/// Strategy for generating random trigger conditions with valid thresholds.
fn arb_condition() -> impl Strategy<Value = StepCondition> {
    prop_oneof![
        Just(StepCondition::Always),
        (0i64..1_000_000i64).prop_map(|n| StepCondition::AmountGt(Decimal::new(n, 2))),
        (0i64..1_000_000i64).prop_map(|n| StepCondition::VarianceGt(Decimal::new(n, 2))),
    ]
}

/// A single mutation against the chain, with indices resolved at apply time.
#[derive(Debug, Clone)]
enum ChainOp {
    Add(StepCondition),
    Remove(usize),
    Rename(usize),
    Rebind(usize, usize),
    Recondition(usize, StepCondition),
    Move(usize, MoveDirection),
}

fn arb_op() -> impl Strategy<Value = ChainOp> {
    prop_oneof![
        arb_condition().prop_map(ChainOp::Add),
        (0usize..12).prop_map(ChainOp::Remove),
        (0usize..12).prop_map(ChainOp::Rename),
        ((0usize..12), (0usize..3)).prop_map(|(s, r)| ChainOp::Rebind(s, r)),
        ((0usize..12), arb_condition()).prop_map(|(s, c)| ChainOp::Recondition(s, c)),
        (
            (0usize..12),
            prop_oneof![Just(MoveDirection::Up), Just(MoveDirection::Down)]
        )
            .prop_map(|(i, d)| ChainOp::Move(i, d)),
    ]
}

fn seeded_registry() -> RoleRegistry {
    let mut registry = RoleRegistry::new();
    registry.add("Auditor", "First-line review", "#2563eb");
    registry.add("Audit Manager", "Escalation review", "#7c3aed");
    registry.add("Administrator", "Full access", "#dc2626");
    registry
}

fn step_id_at(chain: &WorkflowChain, index: usize) -> Option<Uuid> {
    let steps = chain.steps();
    if steps.is_empty() {
        None
    } else {
        Some(steps[index % steps.len()].id)
    }
}

fn apply(chain: &mut WorkflowChain, registry: &RoleRegistry, op: &ChainOp) {
    match op {
        ChainOp::Add(condition) => {
            let _ = chain.add_step(
                NewStepSpec {
                    name: "Generated".to_string(),
                    role_id: None,
                    condition: *condition,
                },
                registry,
            );
        }
        ChainOp::Remove(index) => {
            if let Some(id) = step_id_at(chain, *index) {
                let _ = chain.remove_step(id);
            }
        }
        ChainOp::Rename(index) => {
            if let Some(id) = step_id_at(chain, *index) {
                let _ = chain.update_step(id, StepUpdate::Name("Renamed".to_string()), registry);
            }
        }
        ChainOp::Rebind(index, role_index) => {
            if let Some(id) = step_id_at(chain, *index) {
                let role_id = registry.roles()[role_index % registry.roles().len()].id;
                let _ = chain.update_step(id, StepUpdate::Approver(role_id), registry);
            }
        }
        ChainOp::Recondition(index, condition) => {
            if let Some(id) = step_id_at(chain, *index) {
                let _ = chain.update_step(id, StepUpdate::Condition(*condition), registry);
            }
        }
        ChainOp::Move(index, direction) => {
            let _ = chain.move_step(*index, *direction);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After any sequence of mutations, at most one step is the system step,
    /// and if one exists it is the last element.
    #[test]
    fn prop_system_step_stays_sole_and_last(
        ops in prop::collection::vec(arb_op(), 1..40)
    ) {
        let registry = seeded_registry();
        let mut chain = WorkflowChain::with_settlement("Settlement");

        for op in &ops {
            apply(&mut chain, &registry, op);

            prop_assert!(chain.validate().is_ok());
            let system_count = chain.steps().iter().filter(|s| s.is_system).count();
            prop_assert!(system_count <= 1);
            if system_count == 1 {
                prop_assert!(chain.steps()[chain.len() - 1].is_system);
            }
        }
    }

    /// The invariant also holds for chains that never had a system step.
    #[test]
    fn prop_chain_without_system_step_stays_valid(
        ops in prop::collection::vec(arb_op(), 1..40)
    ) {
        let registry = seeded_registry();
        let mut chain = WorkflowChain::new();

        for op in &ops {
            apply(&mut chain, &registry, op);
            prop_assert!(chain.validate().is_ok());
            prop_assert!(chain.steps().iter().all(|s| !s.is_system));
        }
    }

    /// `move_step(0, Up)` is always a no-op.
    #[test]
    fn prop_move_first_up_is_noop(
        ops in prop::collection::vec(arb_op(), 0..20)
    ) {
        let registry = seeded_registry();
        let mut chain = WorkflowChain::with_settlement("Settlement");
        for op in &ops {
            apply(&mut chain, &registry, op);
        }

        let before = chain.steps().to_vec();
        prop_assert!(!chain.move_step(0, MoveDirection::Up));
        prop_assert_eq!(chain.steps(), before.as_slice());
    }

    /// Moving the last human step down is always a no-op while a system
    /// step exists.
    #[test]
    fn prop_move_last_human_down_is_noop(
        ops in prop::collection::vec(arb_op(), 0..20)
    ) {
        let registry = seeded_registry();
        let mut chain = WorkflowChain::with_settlement("Settlement");
        for op in &ops {
            apply(&mut chain, &registry, op);
        }

        if let Some(system_index) = chain.system_index()
            && system_index > 0
        {
            let before = chain.steps().to_vec();
            prop_assert!(!chain.move_step(system_index - 1, MoveDirection::Down));
            prop_assert_eq!(chain.steps(), before.as_slice());
        }
    }

    /// Serializing and reloading a chain preserves step order and every
    /// field exactly.
    #[test]
    fn prop_serde_round_trip_exact(
        ops in prop::collection::vec(arb_op(), 0..30)
    ) {
        let registry = seeded_registry();
        let mut chain = WorkflowChain::with_settlement("Settlement");
        for op in &ops {
            apply(&mut chain, &registry, op);
        }

        let json = serde_json::to_string(&chain).unwrap();
        let back: WorkflowChain = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.steps(), chain.steps());
    }
}
