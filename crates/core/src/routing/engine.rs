//! Sub-chain computation and step sign-off transitions.

use chrono::Utc;
use uuid::Uuid;

use crate::invoice::Invoice;
use crate::roles::{Permission, Role, RoleRegistry};
use crate::routing::error::RoutingError;
use crate::routing::types::{
    InvoiceStatus, ManualOverride, OverrideKind, RoutedStep, RoutingDecision, StepState,
};
use crate::variance::VarianceClassifier;
use crate::workflow::{StepApprover, StepCondition, WorkflowChain, WorkflowStep};

/// Stateless engine that routes invoices through the approval chain.
///
/// `route` takes immutable snapshots and returns a decision; it performs no
/// I/O and may be invoked concurrently for different invoices.
pub struct RoutingEngine;

impl RoutingEngine {
    /// Routes an invoice: classifies it, computes the applicable sub-chain,
    /// and derives the initial invoice status.
    ///
    /// # Panics
    /// A malformed chain or a step referencing an unregistered role means
    /// the configuration layer failed to reject an invalid mutation; that is
    /// a bug, not a recoverable condition, and this function asserts on it.
    #[must_use]
    pub fn route(
        invoice: &Invoice,
        chain: &WorkflowChain,
        registry: &RoleRegistry,
    ) -> RoutingDecision {
        assert!(
            chain.validate().is_ok(),
            "approval chain failed invariant validation at routing time"
        );
        assert!(
            chain
                .steps()
                .iter()
                .filter_map(|s| s.approver.role_id())
                .all(|id| registry.contains(id)),
            "approval chain references a role missing from the registry"
        );

        let classification = VarianceClassifier::classify(invoice);

        let steps: Vec<RoutedStep> = chain
            .steps()
            .iter()
            .filter(|step| Self::applies(step, invoice, classification.variance))
            .map(|step| RoutedStep {
                step_id: step.id,
                name: step.name.clone(),
                approver: step.approver,
                is_system: step.is_system,
                state: StepState::AwaitingApproval,
                decided_by: None,
                decided_at: None,
                note: None,
            })
            .collect();

        let mut decision = RoutingDecision {
            invoice_id: invoice.id,
            classification,
            steps,
            status: InvoiceStatus::Pending,
            bypassed_chain: false,
            manual_override: None,
        };
        decision.run_automation();
        decision.recompute_status();
        decision
    }

    /// Evaluates a step's trigger condition against the invoice.
    fn applies(step: &WorkflowStep, invoice: &Invoice, variance: rust_decimal::Decimal) -> bool {
        match step.condition {
            StepCondition::Always => true,
            StepCondition::AmountGt(threshold) => invoice.billed_amount > threshold,
            StepCondition::VarianceGt(threshold) => variance.abs() > threshold,
        }
    }
}

impl RoutingDecision {
    /// Approves an awaiting step on behalf of `actor`.
    ///
    /// # Errors
    /// * `RoutingError::StepNotFound` for an id outside the sub-chain
    /// * `RoutingError::SystemStepAutomated` for the system step
    /// * `RoutingError::StepAlreadyDecided` for a terminal step
    /// * `RoutingError::StepOutOfOrder` when an earlier step is still awaiting
    /// * `RoutingError::NotAuthorizedToApprove` when the actor fails the gate
    pub fn approve_step(
        &mut self,
        step_id: Uuid,
        actor: &Role,
        note: Option<String>,
    ) -> Result<(), RoutingError> {
        let index = self.decidable_index(step_id, actor)?;

        let step = &mut self.steps[index];
        step.state = StepState::Approved;
        step.decided_by = Some(actor.id);
        step.decided_at = Some(Utc::now());
        step.note = note;

        self.run_automation();
        self.recompute_status();
        Ok(())
    }

    /// Rejects an awaiting step on behalf of `actor`.
    ///
    /// Rejection short-circuits the chain: every later undecided step,
    /// including the system step, becomes `Skipped`.
    ///
    /// # Errors
    /// The checks of `approve_step`, plus
    /// `RoutingError::RejectionReasonRequired` for an empty reason.
    pub fn reject_step(
        &mut self,
        step_id: Uuid,
        actor: &Role,
        reason: String,
    ) -> Result<(), RoutingError> {
        if reason.trim().is_empty() {
            return Err(RoutingError::RejectionReasonRequired);
        }
        let index = self.decidable_index(step_id, actor)?;

        let step = &mut self.steps[index];
        step.state = StepState::Rejected;
        step.decided_by = Some(actor.id);
        step.decided_at = Some(Utc::now());
        step.note = Some(reason);

        self.skip_undecided();
        self.recompute_status();
        Ok(())
    }

    /// Applies an administrator override, bypassing the chain.
    ///
    /// Undecided steps become `Skipped`, the decision records that the
    /// chain was bypassed, and the status is set directly from the kind.
    ///
    /// # Errors
    /// `RoutingError::OverrideNotAuthorized` unless the actor's role holds
    /// the administrator permission.
    pub fn apply_override(&mut self, kind: OverrideKind, actor: &Role) -> Result<(), RoutingError> {
        if !actor.permissions.has(Permission::AdminSystem) {
            return Err(RoutingError::OverrideNotAuthorized(actor.id));
        }

        self.manual_override = Some(ManualOverride {
            kind,
            acting_role: actor.id,
            applied_at: Utc::now(),
        });
        self.bypassed_chain = true;
        self.skip_undecided();
        self.recompute_status();
        Ok(())
    }

    /// Validates that `step_id` names a human step the actor may decide
    /// right now, and returns its index.
    fn decidable_index(&self, step_id: Uuid, actor: &Role) -> Result<usize, RoutingError> {
        let index = self
            .steps
            .iter()
            .position(|s| s.step_id == step_id)
            .ok_or(RoutingError::StepNotFound(step_id))?;
        let step = &self.steps[index];

        if step.is_system {
            return Err(RoutingError::SystemStepAutomated(step_id));
        }
        if step.state.is_terminal() {
            return Err(RoutingError::StepAlreadyDecided {
                step_id,
                state: step.state,
            });
        }
        if self.steps[..index]
            .iter()
            .any(|s| s.state == StepState::AwaitingApproval)
        {
            return Err(RoutingError::StepOutOfOrder(step_id));
        }

        let gate_passed = actor.permissions.has(Permission::AdminSystem)
            || step.approver == StepApprover::Role(actor.id);
        if !gate_passed {
            return Err(RoutingError::NotAuthorizedToApprove {
                role_id: actor.id,
                step_id,
            });
        }

        Ok(index)
    }

    /// Completes the system step once every preceding applicable step is
    /// approved. No human actor is involved.
    fn run_automation(&mut self) {
        let all_humans_approved = self
            .steps
            .iter()
            .filter(|s| !s.is_system)
            .all(|s| s.state == StepState::Approved);
        if !all_humans_approved {
            return;
        }
        for step in &mut self.steps {
            if step.is_system && step.state == StepState::AwaitingApproval {
                step.state = StepState::Completed;
                step.decided_at = Some(Utc::now());
            }
        }
    }

    /// Marks every undecided step `Skipped` (rejection short-circuit or
    /// chain bypass).
    fn skip_undecided(&mut self) {
        for step in &mut self.steps {
            if step.state == StepState::AwaitingApproval {
                step.state = StepState::Skipped;
            }
        }
    }

    /// Derives the invoice status from the override, the classification,
    /// and the step states.
    ///
    /// Precedence: manual override, then the exception flag (a dispute
    /// dominates the approval path), then rejection, then full approval.
    fn recompute_status(&mut self) {
        self.status = if let Some(manual) = &self.manual_override {
            match manual.kind {
                OverrideKind::QuickApprove => InvoiceStatus::Approved,
                OverrideKind::FlagForReview => InvoiceStatus::Exception,
            }
        } else if self.classification.is_disputed {
            InvoiceStatus::Exception
        } else if self
            .steps
            .iter()
            .any(|s| s.state == StepState::Rejected)
        {
            InvoiceStatus::Rejected
        } else if self
            .steps
            .iter()
            .all(|s| matches!(s.state, StepState::Approved | StepState::Completed))
        {
            InvoiceStatus::Approved
        } else {
            InvoiceStatus::Pending
        };
    }
}
