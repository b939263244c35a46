//! The approval chain and its guarded mutations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::RoleRegistry;
use crate::workflow::error::ChainError;
use crate::workflow::types::{
    MoveDirection, NewStepSpec, StepApprover, StepUpdate, WorkflowStep,
};

/// Ordered sequence of approval steps.
///
/// Owned exclusively by the administrator-facing configuration surface;
/// the routing engine only ever sees a read-only snapshot. Every mutation
/// re-validates the system-step invariant and rejects (never repairs) a
/// violation, so a committed chain is always well-formed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowChain {
    steps: Vec<WorkflowStep>,
}

impl WorkflowChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain containing only the settlement automation step.
    #[must_use]
    pub fn with_settlement(step_name: impl Into<String>) -> Self {
        Self {
            steps: vec![WorkflowStep::system(step_name)],
        }
    }

    /// Returns the steps in chain order.
    #[must_use]
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    /// Number of steps in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Looks up a step by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Position of the system step, if one is configured.
    #[must_use]
    pub fn system_index(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.is_system)
    }

    /// Number of steps bound to the given role.
    #[must_use]
    pub fn role_reference_count(&self, role_id: Uuid) -> usize {
        self.steps
            .iter()
            .filter(|s| s.approver == StepApprover::Role(role_id))
            .count()
    }

    /// Checks the chain invariant: at most one system step, occupying the
    /// final position, and flagged consistently with its approver.
    pub fn validate(&self) -> Result<(), ChainError> {
        let system_count = self.steps.iter().filter(|s| s.is_system).count();
        if system_count > 1 {
            return Err(ChainError::SystemStepDisplaced);
        }
        if let Some(index) = self.system_index()
            && index != self.steps.len() - 1
        {
            return Err(ChainError::SystemStepDisplaced);
        }
        for step in &self.steps {
            if step.is_system != matches!(step.approver, StepApprover::System) {
                return Err(ChainError::SystemStepDisplaced);
            }
        }
        Ok(())
    }

    /// Adds a step with a fresh id.
    ///
    /// The step is inserted immediately before the system step if one
    /// exists, else appended. An unspecified role defaults to the first
    /// role in the registry.
    ///
    /// # Errors
    /// * `ChainError::InvalidCondition` for a negative threshold
    /// * `ChainError::UnknownRole` if the named role is not registered
    /// * `ChainError::NoDefaultRole` if no role was named and the registry
    ///   is empty
    pub fn add_step(
        &mut self,
        spec: NewStepSpec,
        registry: &RoleRegistry,
    ) -> Result<&WorkflowStep, ChainError> {
        spec.condition.validate()?;

        let role_id = match spec.role_id {
            Some(id) => {
                if !registry.contains(id) {
                    return Err(ChainError::UnknownRole(id));
                }
                id
            }
            None => registry.first().ok_or(ChainError::NoDefaultRole)?.id,
        };

        let step = WorkflowStep::new(spec.name, role_id, spec.condition);
        let id = step.id;
        let insert_at = self.system_index().unwrap_or(self.steps.len());

        self.commit(|steps| steps.insert(insert_at, step))?;
        self.get(id).ok_or(ChainError::StepNotFound(id))
    }

    /// Removes a non-system step and returns it.
    ///
    /// # Errors
    /// * `ChainError::StepNotFound` for an unknown id
    /// * `ChainError::SystemStepImmutable` when the target is the system
    ///   step; the chain is unchanged after the failed call
    pub fn remove_step(&mut self, id: Uuid) -> Result<WorkflowStep, ChainError> {
        let index = self
            .steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(ChainError::StepNotFound(id))?;
        if self.steps[index].is_system {
            return Err(ChainError::SystemStepImmutable(id));
        }

        let mut removed = None;
        self.commit(|steps| removed = Some(steps.remove(index)))?;
        removed.ok_or(ChainError::StepNotFound(id))
    }

    /// Applies a single-field update to a non-system step.
    ///
    /// # Errors
    /// * `ChainError::StepNotFound` for an unknown id
    /// * `ChainError::SystemStepImmutable` when the target is the system step
    /// * `ChainError::UnknownRole` when rebinding to an unregistered role
    /// * `ChainError::InvalidCondition` for a negative threshold
    pub fn update_step(
        &mut self,
        id: Uuid,
        update: StepUpdate,
        registry: &RoleRegistry,
    ) -> Result<&WorkflowStep, ChainError> {
        let index = self
            .steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(ChainError::StepNotFound(id))?;
        if self.steps[index].is_system {
            return Err(ChainError::SystemStepImmutable(id));
        }

        match &update {
            StepUpdate::Approver(role_id) => {
                if !registry.contains(*role_id) {
                    return Err(ChainError::UnknownRole(*role_id));
                }
            }
            StepUpdate::Condition(condition) => condition.validate()?,
            StepUpdate::Name(_) => {}
        }

        self.commit(|steps| match update {
            StepUpdate::Name(name) => steps[index].name = name,
            StepUpdate::Approver(role_id) => steps[index].approver = StepApprover::Role(role_id),
            StepUpdate::Condition(condition) => steps[index].condition = condition,
        })?;
        Ok(&self.steps[index])
    }

    /// Swaps the step at `index` with its immediate neighbor.
    ///
    /// Returns `false` (a no-op, not an error) when the move would violate
    /// ordering: index 0 moving up, an out-of-bounds index, or any swap
    /// involving the system step.
    pub fn move_step(&mut self, index: usize, direction: MoveDirection) -> bool {
        let Some(target) = (match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        }) else {
            return false;
        };
        if index >= self.steps.len() || target >= self.steps.len() {
            return false;
        }
        // A swap involving the system step would move a human step past it.
        if self.steps[index].is_system || self.steps[target].is_system {
            return false;
        }

        self.commit(|steps| steps.swap(index, target)).is_ok()
    }

    /// Applies a mutation to a working copy, re-validates the invariant,
    /// and commits only on success. A violation leaves `self` untouched.
    fn commit(&mut self, mutate: impl FnOnce(&mut Vec<WorkflowStep>)) -> Result<(), ChainError> {
        let mut steps = self.steps.clone();
        mutate(&mut steps);
        let candidate = Self { steps };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}
