//! Property-based tests for the routing engine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::invoice::Invoice;
use crate::roles::RoleRegistry;
use crate::routing::engine::RoutingEngine;
use crate::routing::types::{InvoiceStatus, StepState};
use crate::workflow::{NewStepSpec, StepCondition, WorkflowChain};

fn arb_condition() -> impl Strategy<Value = StepCondition> {
    prop_oneof![
        Just(StepCondition::Always),
        (0i64..500_000i64).prop_map(|n| StepCondition::AmountGt(Decimal::new(n, 2))),
        (0i64..500_000i64).prop_map(|n| StepCondition::VarianceGt(Decimal::new(n, 2))),
    ]
}

fn arb_invoice() -> impl Strategy<Value = Invoice> {
    (
        1i64..1_000_000i64,
        1i64..1_000_000i64,
        prop::option::of(1i64..1_000_000i64),
        prop::bool::ANY,
    )
        .prop_map(|(billed, audit, tms, flagged)| Invoice {
            id: Uuid::new_v4(),
            carrier: "Carrier".to_string(),
            billed_amount: Decimal::new(billed, 2),
            audit_amount: Decimal::new(audit, 2),
            tms_estimated_amount: tms.map(|n| Decimal::new(n, 2)),
            duplicate_of: None,
            flagged,
        })
}

fn build_chain(conditions: &[StepCondition], registry: &RoleRegistry) -> WorkflowChain {
    let mut chain = WorkflowChain::with_settlement("Settlement");
    for (i, condition) in conditions.iter().enumerate() {
        chain
            .add_step(
                NewStepSpec {
                    name: format!("Step {i}"),
                    role_id: None,
                    condition: *condition,
                },
                registry,
            )
            .expect("generated conditions are valid");
    }
    chain
}

fn seeded_registry() -> RoleRegistry {
    let mut registry = RoleRegistry::new();
    registry.add("Auditor", "First-line review", "#2563eb");
    registry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// The applicable sub-chain is an order-preserving subsequence of the
    /// configured chain, with the system step last when it applies.
    #[test]
    fn prop_subchain_preserves_order(
        conditions in prop::collection::vec(arb_condition(), 0..6),
        invoice in arb_invoice()
    ) {
        let registry = seeded_registry();
        let chain = build_chain(&conditions, &registry);
        let decision = RoutingEngine::route(&invoice, &chain, &registry);

        // Every routed step comes from the chain, in chain order
        let chain_order: Vec<Uuid> = chain.steps().iter().map(|s| s.id).collect();
        let mut last_position = 0usize;
        for routed in &decision.steps {
            let position = chain_order
                .iter()
                .position(|id| *id == routed.step_id)
                .expect("routed step exists in the chain");
            prop_assert!(position >= last_position);
            last_position = position;
        }

        // System step is included (ALWAYS) and last
        let last = decision.steps.last().expect("system step always applies");
        prop_assert!(last.is_system);
    }

    /// A step with an amount trigger applies exactly when the billed amount
    /// exceeds the threshold.
    #[test]
    fn prop_amount_trigger_exact(
        threshold in 0i64..1_000_000i64,
        invoice in arb_invoice()
    ) {
        let registry = seeded_registry();
        let threshold = Decimal::new(threshold, 2);
        let chain = build_chain(&[StepCondition::AmountGt(threshold)], &registry);
        let decision = RoutingEngine::route(&invoice, &chain, &registry);

        let human_steps = decision.steps.iter().filter(|s| !s.is_system).count();
        if invoice.billed_amount > threshold {
            prop_assert_eq!(human_steps, 1);
        } else {
            prop_assert_eq!(human_steps, 0);
        }
    }

    /// A variance trigger fires on the absolute variance.
    #[test]
    fn prop_variance_trigger_absolute(
        threshold in 0i64..1_000_000i64,
        invoice in arb_invoice()
    ) {
        let registry = seeded_registry();
        let threshold = Decimal::new(threshold, 2);
        let chain = build_chain(&[StepCondition::VarianceGt(threshold)], &registry);
        let decision = RoutingEngine::route(&invoice, &chain, &registry);

        let human_steps = decision.steps.iter().filter(|s| !s.is_system).count();
        if invoice.variance().abs() > threshold {
            prop_assert_eq!(human_steps, 1);
        } else {
            prop_assert_eq!(human_steps, 0);
        }
    }

    /// A freshly routed decision never reports Rejected, and reports
    /// Exception exactly when the invoice is disputed.
    #[test]
    fn prop_initial_status_consistent(
        conditions in prop::collection::vec(arb_condition(), 0..6),
        invoice in arb_invoice()
    ) {
        let registry = seeded_registry();
        let chain = build_chain(&conditions, &registry);
        let decision = RoutingEngine::route(&invoice, &chain, &registry);

        prop_assert!(decision.status != InvoiceStatus::Rejected);
        prop_assert!(!decision.bypassed_chain);
        if decision.classification.is_disputed {
            prop_assert_eq!(decision.status, InvoiceStatus::Exception);
        }
        // Steps start awaiting, except system automation with no human gate
        for step in &decision.steps {
            if !step.is_system {
                prop_assert_eq!(step.state, StepState::AwaitingApproval);
            }
        }
    }

    /// Routing is deterministic for a fixed invoice and chain.
    #[test]
    fn prop_route_deterministic(
        conditions in prop::collection::vec(arb_condition(), 0..6),
        invoice in arb_invoice()
    ) {
        let registry = seeded_registry();
        let chain = build_chain(&conditions, &registry);
        let first = RoutingEngine::route(&invoice, &chain, &registry);
        let second = RoutingEngine::route(&invoice, &chain, &registry);

        prop_assert_eq!(first.classification, second.classification);
        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(
            first.steps.iter().map(|s| s.step_id).collect::<Vec<_>>(),
            second.steps.iter().map(|s| s.step_id).collect::<Vec<_>>()
        );
    }
}
