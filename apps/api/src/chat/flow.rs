//! Lifecycle of a multi-turn feature (interview, knowledge test).
//!
//! NotStarted → InProgress → Completed, with `reset` as the only way back.
//! The machine only tracks state; disabling user actions in a given state is
//! the caller's job.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlowState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {action} while flow is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: FlowState,
    },
}

#[derive(Debug, Default, Clone)]
pub struct FlowMachine {
    state: FlowState,
}

impl FlowMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == FlowState::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.state == FlowState::Completed
    }

    pub fn start(&mut self) -> Result<(), FlowError> {
        match self.state {
            FlowState::NotStarted => {
                self.state = FlowState::InProgress;
                Ok(())
            }
            state => Err(FlowError::InvalidTransition {
                action: "start",
                state,
            }),
        }
    }

    /// Moves InProgress → Completed. Returns `Ok(true)` on the transition and
    /// `Ok(false)` if the flow was already completed, so a terminal condition
    /// observed twice never completes twice.
    pub fn complete(&mut self) -> Result<bool, FlowError> {
        match self.state {
            FlowState::InProgress => {
                self.state = FlowState::Completed;
                Ok(true)
            }
            FlowState::Completed => Ok(false),
            FlowState::NotStarted => Err(FlowError::InvalidTransition {
                action: "complete",
                state: FlowState::NotStarted,
            }),
        }
    }

    /// Fails unless the flow is running.
    pub fn ensure_in_progress(&self, action: &'static str) -> Result<(), FlowError> {
        if self.is_in_progress() {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    pub fn reset(&mut self) {
        self.state = FlowState::NotStarted;
    }
}
