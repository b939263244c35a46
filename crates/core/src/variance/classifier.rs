//! Variance computation and exception reason tagging.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invoice::Invoice;

/// Why an invoice is disputed, or `Clean` when it is not.
///
/// Precedence is fixed: a duplicate-billing signal beats a missing TMS
/// estimate, which beats a manual flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonTag {
    /// A duplicate-billing signal is present.
    #[serde(rename = "Duplicate")]
    Duplicate,
    /// No matching transport-management-system estimate (ghost invoice).
    #[serde(rename = "Non-TMS")]
    NonTms,
    /// Manually flagged by an auditor.
    #[serde(rename = "Flagged for Review")]
    FlaggedForReview,
    /// No dispute signal.
    #[serde(rename = "Clean")]
    Clean,
}

impl ReasonTag {
    /// Returns the display string of the tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "Duplicate",
            Self::NonTms => "Non-TMS",
            Self::FlaggedForReview => "Flagged for Review",
            Self::Clean => "Clean",
        }
    }
}

impl fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Billed minus audited amount. Positive = carrier overbilled.
    pub variance: Decimal,
    /// Variance relative to the audited amount, as a percentage.
    /// Zero when the audited amount is zero.
    pub variance_percentage: Decimal,
    /// Dispute reason, `Clean` when none.
    pub reason: ReasonTag,
    /// Whether any dispute signal is present.
    pub is_disputed: bool,
}

/// Stateless classifier for invoice variance and dispute reasons.
pub struct VarianceClassifier;

impl VarianceClassifier {
    /// Classifies an invoice. Pure function of its input.
    #[must_use]
    pub fn classify(invoice: &Invoice) -> Classification {
        let variance = invoice.variance();
        let variance_percentage = if invoice.audit_amount.is_zero() {
            Decimal::ZERO
        } else {
            (variance / invoice.audit_amount) * Decimal::ONE_HUNDRED
        };

        // First match wins
        let reason = if invoice.duplicate_of.is_some() {
            ReasonTag::Duplicate
        } else if invoice.tms_estimated_amount.is_none() {
            ReasonTag::NonTms
        } else if invoice.flagged {
            ReasonTag::FlaggedForReview
        } else {
            ReasonTag::Clean
        };

        Classification {
            variance,
            variance_percentage,
            reason,
            is_disputed: reason != ReasonTag::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn clean_invoice(billed: Decimal, audit: Decimal) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            carrier: "Meridian Freight".to_string(),
            billed_amount: billed,
            audit_amount: audit,
            tms_estimated_amount: Some(audit),
            duplicate_of: None,
            flagged: false,
        }
    }

    #[test]
    fn test_clean_invoice() {
        let result = VarianceClassifier::classify(&clean_invoice(dec!(1000), dec!(1000)));
        assert_eq!(result.variance, Decimal::ZERO);
        assert_eq!(result.reason, ReasonTag::Clean);
        assert!(!result.is_disputed);
    }

    #[test]
    fn test_overbilled_variance_is_positive() {
        let result = VarianceClassifier::classify(&clean_invoice(dec!(1000), dec!(850)));
        assert_eq!(result.variance, dec!(150));
        assert!(result.variance.is_sign_positive());
    }

    #[test]
    fn test_underbilled_variance_is_negative() {
        let result = VarianceClassifier::classify(&clean_invoice(dec!(700), dec!(850)));
        assert_eq!(result.variance, dec!(-150));
    }

    #[test]
    fn test_variance_percentage() {
        let result = VarianceClassifier::classify(&clean_invoice(dec!(1100), dec!(1000)));
        assert_eq!(result.variance_percentage, dec!(10));
    }

    #[test]
    fn test_zero_audit_amount_percentage_guard() {
        let result = VarianceClassifier::classify(&clean_invoice(dec!(500), dec!(0)));
        assert_eq!(result.variance_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_signal_wins() {
        let mut invoice = clean_invoice(dec!(1000), dec!(1000));
        invoice.duplicate_of = Some(Uuid::new_v4());
        invoice.tms_estimated_amount = None;
        invoice.flagged = true;

        let result = VarianceClassifier::classify(&invoice);
        assert_eq!(result.reason, ReasonTag::Duplicate);
        assert!(result.is_disputed);
    }

    #[test]
    fn test_missing_tms_estimate_is_ghost() {
        let mut invoice = clean_invoice(dec!(1000), dec!(1000));
        invoice.tms_estimated_amount = None;
        invoice.flagged = true;

        let result = VarianceClassifier::classify(&invoice);
        assert_eq!(result.reason, ReasonTag::NonTms);
    }

    #[test]
    fn test_manual_flag() {
        let mut invoice = clean_invoice(dec!(1000), dec!(1000));
        invoice.flagged = true;

        let result = VarianceClassifier::classify(&invoice);
        assert_eq!(result.reason, ReasonTag::FlaggedForReview);
        assert!(result.is_disputed);
    }

    #[test]
    fn test_reason_tag_display() {
        assert_eq!(ReasonTag::Duplicate.to_string(), "Duplicate");
        assert_eq!(ReasonTag::NonTms.to_string(), "Non-TMS");
        assert_eq!(ReasonTag::FlaggedForReview.to_string(), "Flagged for Review");
        assert_eq!(ReasonTag::Clean.to_string(), "Clean");
    }
}
