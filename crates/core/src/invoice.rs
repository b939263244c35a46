//! Freight invoice input record.
//!
//! Invoices are supplied by an external store; the core consumes them
//! read-only. Amounts use `Decimal` precision, never floats.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freight invoice under audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier for the invoice.
    pub id: Uuid,
    /// Carrier that submitted the invoice.
    pub carrier: String,
    /// Amount claimed by the carrier.
    pub billed_amount: Decimal,
    /// System-computed correct amount.
    pub audit_amount: Decimal,
    /// Pre-shipment estimate from the transport management system.
    /// Absent for non-TMS (ghost) shipments.
    pub tms_estimated_amount: Option<Decimal>,
    /// Invoice this one duplicates, when a duplicate-billing signal is present.
    pub duplicate_of: Option<Uuid>,
    /// Manually flagged for review by an auditor.
    pub flagged: bool,
}

impl Invoice {
    /// Billed amount minus audited amount. Positive means the carrier overbilled.
    #[must_use]
    pub fn variance(&self) -> Decimal {
        self.billed_amount - self.audit_amount
    }
}
