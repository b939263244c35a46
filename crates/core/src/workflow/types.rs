//! Workflow step domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::workflow::error::ChainError;

/// Who signs off on a step: a human role, or the settlement automation.
///
/// On the wire this is the role id string, or the literal `"system"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StepApprover {
    /// A human role from the registry.
    Role(Uuid),
    /// The automation-only settlement step.
    System,
}

impl StepApprover {
    /// Returns the role id for a human approver.
    #[must_use]
    pub const fn role_id(&self) -> Option<Uuid> {
        match self {
            Self::Role(id) => Some(*id),
            Self::System => None,
        }
    }
}

impl From<StepApprover> for String {
    fn from(approver: StepApprover) -> Self {
        match approver {
            StepApprover::Role(id) => id.to_string(),
            StepApprover::System => "system".to_string(),
        }
    }
}

impl TryFrom<String> for StepApprover {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "system" {
            return Ok(Self::System);
        }
        Uuid::parse_str(&value)
            .map(Self::Role)
            .map_err(|_| format!("invalid approver: {value}"))
    }
}

impl fmt::Display for StepApprover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(id) => write!(f, "{id}"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Trigger condition deciding whether a step applies to an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "conditionType", content = "conditionValue")]
pub enum StepCondition {
    /// The step always applies.
    #[serde(rename = "ALWAYS")]
    Always,
    /// Applies when the billed amount exceeds the threshold.
    #[serde(rename = "AMOUNT_GT")]
    AmountGt(Decimal),
    /// Applies when the absolute variance exceeds the threshold.
    #[serde(rename = "VARIANCE_GT")]
    VarianceGt(Decimal),
}

impl StepCondition {
    /// Builds a condition from its wire parts.
    ///
    /// # Errors
    /// `ChainError::InvalidCondition` for an unknown condition type, a
    /// missing threshold on a conditional type, or a negative threshold.
    pub fn from_parts(condition_type: &str, value: Option<Decimal>) -> Result<Self, ChainError> {
        let condition = match condition_type {
            "ALWAYS" => Self::Always,
            "AMOUNT_GT" => Self::AmountGt(value.ok_or_else(|| ChainError::InvalidCondition {
                detail: "AMOUNT_GT requires a threshold".to_string(),
            })?),
            "VARIANCE_GT" => Self::VarianceGt(value.ok_or_else(|| ChainError::InvalidCondition {
                detail: "VARIANCE_GT requires a threshold".to_string(),
            })?),
            other => {
                return Err(ChainError::InvalidCondition {
                    detail: format!("unknown condition type {other}"),
                });
            }
        };
        condition.validate()?;
        Ok(condition)
    }

    /// Threshold for the conditional variants; `None` for `Always`.
    #[must_use]
    pub const fn threshold(&self) -> Option<Decimal> {
        match self {
            Self::Always => None,
            Self::AmountGt(t) | Self::VarianceGt(t) => Some(*t),
        }
    }

    /// Returns the wire name of the condition type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Always => "ALWAYS",
            Self::AmountGt(_) => "AMOUNT_GT",
            Self::VarianceGt(_) => "VARIANCE_GT",
        }
    }

    /// Checks that a conditional threshold is non-negative.
    pub fn validate(&self) -> Result<(), ChainError> {
        match self.threshold() {
            Some(t) if t.is_sign_negative() => Err(ChainError::InvalidCondition {
                detail: format!("{} threshold must be non-negative, got {t}", self.kind()),
            }),
            _ => Ok(()),
        }
    }
}

/// One step of the approval chain. Position is implicit (chain order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Unique identifier for the step.
    pub id: Uuid,
    /// Human-readable step name.
    #[serde(rename = "stepName")]
    pub name: String,
    /// Who signs off on this step.
    #[serde(rename = "roleId")]
    pub approver: StepApprover,
    /// Trigger condition.
    #[serde(flatten)]
    pub condition: StepCondition,
    /// Whether this is the automation-only settlement step.
    #[serde(rename = "isSystemStep")]
    pub is_system: bool,
}

impl WorkflowStep {
    /// Creates a human step.
    #[must_use]
    pub fn new(name: impl Into<String>, role_id: Uuid, condition: StepCondition) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            approver: StepApprover::Role(role_id),
            condition,
            is_system: false,
        }
    }

    /// Creates the settlement automation step. It always applies.
    #[must_use]
    pub fn system(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            approver: StepApprover::System,
            condition: StepCondition::Always,
            is_system: true,
        }
    }
}

/// Input for `WorkflowChain::add_step`.
#[derive(Debug, Clone)]
pub struct NewStepSpec {
    /// Step name.
    pub name: String,
    /// Role to bind; defaults to the registry's first role when `None`.
    pub role_id: Option<Uuid>,
    /// Trigger condition.
    pub condition: StepCondition,
}

/// A single-field update for `WorkflowChain::update_step`.
#[derive(Debug, Clone)]
pub enum StepUpdate {
    /// Rename the step.
    Name(String),
    /// Rebind the step to another role.
    Approver(Uuid),
    /// Replace the trigger condition.
    Condition(StepCondition),
}

/// Direction for `WorkflowChain::move_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Toward the front of the chain.
    Up,
    /// Toward the back of the chain.
    Down,
}
