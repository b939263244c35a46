//! Property-based tests for the variance classifier.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::invoice::Invoice;
use crate::variance::classifier::{ReasonTag, VarianceClassifier};

/// Strategy for generating invoices across the dispute-signal space.
fn arb_invoice() -> impl Strategy<Value = Invoice> {
    (
        -1_000_000i64..1_000_000i64,
        0i64..1_000_000i64,
        prop::option::of(0i64..1_000_000i64),
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(billed, audit, tms, duplicate, flagged)| Invoice {
            id: Uuid::new_v4(),
            carrier: "Carrier".to_string(),
            billed_amount: Decimal::new(billed, 2),
            audit_amount: Decimal::new(audit, 2),
            tms_estimated_amount: tms.map(|n| Decimal::new(n, 2)),
            duplicate_of: duplicate.then(Uuid::new_v4),
            flagged,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Same invoice in, same classification out, for all invocations.
    #[test]
    fn prop_classify_deterministic(invoice in arb_invoice()) {
        let first = VarianceClassifier::classify(&invoice);
        let second = VarianceClassifier::classify(&invoice);
        prop_assert_eq!(first, second);
    }

    /// Variance is exactly billed minus audited, sign preserved.
    #[test]
    fn prop_variance_sign_preserved(invoice in arb_invoice()) {
        let result = VarianceClassifier::classify(&invoice);
        prop_assert_eq!(result.variance, invoice.billed_amount - invoice.audit_amount);
    }

    /// The disputed flag is exactly "reason is not Clean".
    #[test]
    fn prop_disputed_iff_not_clean(invoice in arb_invoice()) {
        let result = VarianceClassifier::classify(&invoice);
        prop_assert_eq!(result.is_disputed, result.reason != ReasonTag::Clean);
    }

    /// Reason precedence: duplicate signal dominates all other signals.
    #[test]
    fn prop_duplicate_dominates(invoice in arb_invoice()) {
        let mut invoice = invoice;
        invoice.duplicate_of = Some(Uuid::new_v4());
        let result = VarianceClassifier::classify(&invoice);
        prop_assert_eq!(result.reason, ReasonTag::Duplicate);
    }

    /// Reason precedence: with no duplicate signal, a missing TMS estimate
    /// beats the manual flag.
    #[test]
    fn prop_ghost_beats_flag(invoice in arb_invoice()) {
        let mut invoice = invoice;
        invoice.duplicate_of = None;
        invoice.tms_estimated_amount = None;
        invoice.flagged = true;
        let result = VarianceClassifier::classify(&invoice);
        prop_assert_eq!(result.reason, ReasonTag::NonTms);
    }
}
