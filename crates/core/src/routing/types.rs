//! Routing domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::variance::Classification;
use crate::workflow::StepApprover;

/// Terminal disposition of an invoice.
///
/// `Exception` and mid-chain approval progress are orthogonal: a disputed
/// invoice reports `Exception` even while steps are still awaiting sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Awaiting one or more step decisions.
    Pending,
    /// Every applicable step signed off, or an administrator quick-approved.
    Approved,
    /// A dispute reason is present, or an administrator flagged for review.
    Exception,
    /// A human step was rejected.
    Rejected,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Exception => "EXCEPTION",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "EXCEPTION" => Some(Self::Exception),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of one step instance within a routing decision.
///
/// `AwaitingApproval` transitions to exactly one of the terminal states;
/// terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    /// Waiting for the gated role to decide.
    AwaitingApproval,
    /// Signed off by the gated role.
    Approved,
    /// Rejected by the gated role.
    Rejected,
    /// Short-circuited by a rejection or an override.
    Skipped,
    /// The system step ran its automation.
    Completed,
}

impl StepState {
    /// Returns true once the step can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::AwaitingApproval)
    }
}

/// One applicable step within a routing decision, with its sign-off state
/// and audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedStep {
    /// Id of the chain step this instance was routed from.
    pub step_id: Uuid,
    /// Step name at routing time.
    #[serde(rename = "stepName")]
    pub name: String,
    /// Who signs off.
    #[serde(rename = "roleId")]
    pub approver: StepApprover,
    /// Whether this is the settlement automation step.
    #[serde(rename = "isSystemStep")]
    pub is_system: bool,
    /// Current state.
    pub state: StepState,
    /// Role that decided the step, once decided.
    pub decided_by: Option<Uuid>,
    /// When the step was decided.
    pub decided_at: Option<DateTime<Utc>>,
    /// Approval note or rejection reason.
    pub note: Option<String>,
}

/// Administrator override kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideKind {
    /// Directly approve, bypassing the chain.
    #[serde(rename = "quickApprove")]
    QuickApprove,
    /// Directly mark as an exception for review.
    #[serde(rename = "flagForReview")]
    FlagForReview,
}

/// Record of an administrator override that bypassed the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    /// What the administrator did.
    pub kind: OverrideKind,
    /// Role that applied the override.
    pub acting_role: Uuid,
    /// When the override was applied.
    pub applied_at: DateTime<Utc>,
}

/// The routing engine's answer for one invoice: the applicable sub-chain,
/// per-step states, and the derived invoice status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    /// The routed invoice.
    pub invoice_id: Uuid,
    /// Variance and dispute classification.
    pub classification: Classification,
    /// The applicable sub-chain, in original chain order.
    pub steps: Vec<RoutedStep>,
    /// Derived invoice status.
    pub status: InvoiceStatus,
    /// True when a manual override bypassed the chain.
    pub bypassed_chain: bool,
    /// The override record, when one was applied.
    pub manual_override: Option<ManualOverride>,
}
