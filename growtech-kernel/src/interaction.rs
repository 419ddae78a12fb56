//! Per-submission state machine.

use growtech_primitives::TaskKind;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// States a single submission moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    /// Waiting for the user to submit.
    Idle,
    /// Checking that the user supplied some text.
    Validating,
    /// Assembling the prompt.
    Building,
    /// Waiting on the generation model; shown as a loading indicator.
    Generating,
    /// Generated text is ready for display.
    Rendered,
    /// The submission had no usable input.
    EmptyInputError,
    /// The model call failed.
    GenerationError,
}

impl InteractionState {
    /// Returns `true` while the model is working.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Generating)
    }

    /// Returns `true` for the two failure states.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::EmptyInputError | Self::GenerationError)
    }

    /// Returns `true` once the submission produced something to show.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(
            self,
            Self::Rendered | Self::EmptyInputError | Self::GenerationError
        )
    }
}

/// Events that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// The user pressed the tab's submit button.
    Submit,
    /// Input is present.
    InputAccepted,
    /// Input is empty or whitespace only.
    InputRejected,
    /// The prompt has been assembled.
    PromptBuilt,
    /// The model returned usable text.
    GenerationSucceeded,
    /// The model call failed.
    GenerationFailed,
    /// Result shown; go back to waiting.
    Reset,
}

/// State holder for one submission on one tab.
#[derive(Debug, Clone, Copy)]
pub struct Interaction {
    kind: TaskKind,
    state: InteractionState,
}

impl Interaction {
    /// Starts a fresh interaction in [`InteractionState::Idle`].
    #[must_use]
    pub const fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            state: InteractionState::Idle,
        }
    }

    /// Returns the task this interaction belongs to.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    /// Applies an event, returning the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::InvalidTransition`] when the event is not
    /// allowed from the current state.
    pub fn transition(&mut self, event: InteractionEvent) -> InteractionResult<InteractionState> {
        use InteractionEvent as E;
        use InteractionState as S;

        let next = match (self.state, event) {
            (S::Idle, E::Submit) => Some(S::Validating),
            (S::Validating, E::InputAccepted) => Some(S::Building),
            (S::Validating | S::Building, E::InputRejected) => Some(S::EmptyInputError),
            (S::Building, E::PromptBuilt) => Some(S::Generating),
            (S::Generating, E::GenerationSucceeded) => Some(S::Rendered),
            (S::Generating, E::GenerationFailed) => Some(S::GenerationError),
            (S::Rendered | S::EmptyInputError | S::GenerationError, E::Reset) => Some(S::Idle),
            _ => None,
        };

        let Some(next_state) = next else {
            return Err(InteractionError::InvalidTransition {
                kind: self.kind,
                from: self.state,
                event,
            });
        };

        debug!(
            kind = %self.kind,
            from = ?self.state,
            to = ?next_state,
            ?event,
            "interaction transition"
        );
        self.state = next_state;
        Ok(self.state)
    }
}

/// Errors emitted by the interaction state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    /// Transition was not permitted from the current state.
    #[error("invalid interaction transition from {from:?} via {event:?} on {kind} tab")]
    InvalidTransition {
        /// Tab whose transition failed.
        kind: TaskKind,
        /// State prior to the attempted transition.
        from: InteractionState,
        /// Event that triggered the failure.
        event: InteractionEvent,
    },
}

/// Result alias used for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;
