//! Tab controllers: validate, build, generate, report.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use growtech_primitives::{RequestId, TaskKind, TaskRequest};
use growtech_prompts::PromptBuilder;
use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::client::{GenerationClient, GenerationFailure};
use crate::interaction::{Interaction, InteractionEvent, InteractionResult, InteractionState};
use crate::shared::ClientHandle;

/// Output budget used for every task unless configured otherwise.
pub const DEFAULT_MAX_LENGTH: u32 = 300;

/// The only message shown to the user when generation fails.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while generating a response. Please try again.";

/// What the presentation layer should display after a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Generated text plus the tab's acknowledgement.
    Rendered {
        /// Heading placed above the text.
        heading: &'static str,
        /// Text produced by the model.
        text: String,
        /// Success message for the tab.
        acknowledgement: &'static str,
    },
    /// The user submitted nothing.
    EmptyInput {
        /// Tab-specific prompt to enter something.
        message: &'static str,
    },
    /// The model call failed; details are only in the logs.
    GenerationError {
        /// Always [`GENERIC_FAILURE_MESSAGE`].
        message: &'static str,
    },
}

impl Outcome {
    /// State the interaction settled in before returning to idle.
    #[must_use]
    pub const fn state(&self) -> InteractionState {
        match self {
            Self::Rendered { .. } => InteractionState::Rendered,
            Self::EmptyInput { .. } => InteractionState::EmptyInputError,
            Self::GenerationError { .. } => InteractionState::GenerationError,
        }
    }

    /// Returns the generated text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Rendered { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    fn generation_error() -> Self {
        Self::GenerationError {
            message: GENERIC_FAILURE_MESSAGE,
        }
    }
}

/// Receives every state a submission enters.
///
/// [`InteractionState::Generating`] is the loading indicator.
pub trait StatusObserver: Send + Sync {
    /// Called after each transition.
    fn on_state(&self, kind: TaskKind, request_id: RequestId, state: InteractionState);
}

/// Observer that writes status changes to the tracing system.
#[derive(Debug, Default)]
pub struct TracingStatusObserver;

impl StatusObserver for TracingStatusObserver {
    fn on_state(&self, kind: TaskKind, request_id: RequestId, state: InteractionState) {
        match state {
            InteractionState::Generating => {
                info!(%kind, %request_id, status = kind.loading_text(), "generating");
            }
            InteractionState::Rendered => info!(%kind, %request_id, "rendered"),
            InteractionState::EmptyInputError | InteractionState::GenerationError => {
                info!(%kind, %request_id, ?state, "submission failed");
            }
            _ => debug!(%kind, %request_id, ?state, "status"),
        }
    }
}

/// Observer that records every state it sees.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    seen: Mutex<Vec<(TaskKind, InteractionState)>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns and clears the recorded states.
    #[must_use]
    pub fn drain(&self) -> Vec<(TaskKind, InteractionState)> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.drain(..).collect()
    }
}

impl StatusObserver for CollectingObserver {
    fn on_state(&self, kind: TaskKind, _request_id: RequestId, state: InteractionState) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, state));
    }
}

/// Runs submissions for one tab.
///
/// Every submission gets its own [`Interaction`]; the controller itself holds
/// nothing mutable, so one instance serves any number of sessions.
#[derive(Clone)]
pub struct InteractionController {
    kind: TaskKind,
    prompts: Arc<PromptBuilder>,
    client: ClientHandle,
    observer: Arc<dyn StatusObserver>,
    max_length: u32,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("kind", &self.kind)
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}

impl InteractionController {
    /// Creates a controller for `kind` using the built-in templates.
    ///
    /// Pass [`ClientHandle::Shared`] to use whichever client is installed in
    /// the [`shared`](crate::shared) slot at submission time.
    #[must_use]
    pub fn new(kind: TaskKind, client: impl Into<ClientHandle>) -> Self {
        Self {
            kind,
            prompts: Arc::new(PromptBuilder::new()),
            client: client.into(),
            observer: Arc::new(TracingStatusObserver),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Replaces the status observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Overrides the output budget.
    #[must_use]
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    /// Shares an existing prompt builder.
    #[must_use]
    pub fn with_prompt_builder(mut self, prompts: Arc<PromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Returns the tab this controller serves.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the output budget.
    #[must_use]
    pub const fn max_length(&self) -> u32 {
        self.max_length
    }

    /// Handles one submission from this controller's tab.
    ///
    /// A request tagged with another kind is handled as this tab's request.
    /// Never fails: every problem is folded into an [`Outcome`].
    pub async fn submit(&self, request: TaskRequest) -> Outcome {
        let request = if request.kind() == self.kind {
            request
        } else {
            debug!(from = %request.kind(), to = %self.kind, "re-keying request");
            TaskRequest::new(self.kind, request.text()).with_skill_level(request.skill_level())
        };
        let request_id = RequestId::random();
        let span = info_span!("submission", kind = %self.kind, %request_id);

        async {
            match self.run(&request, request_id).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(error = %err, "interaction aborted");
                    Outcome::generation_error()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &TaskRequest, request_id: RequestId) -> InteractionResult<Outcome> {
        let mut interaction = Interaction::new(self.kind);
        self.advance(&mut interaction, request_id, InteractionEvent::Submit)?;

        if request.is_blank() {
            self.advance(&mut interaction, request_id, InteractionEvent::InputRejected)?;
            self.advance(&mut interaction, request_id, InteractionEvent::Reset)?;
            return Ok(Outcome::EmptyInput {
                message: self.kind.empty_input_message(),
            });
        }
        self.advance(&mut interaction, request_id, InteractionEvent::InputAccepted)?;

        let prompt = match self.prompts.build_request(request) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!(error = %err, "prompt rejected");
                self.advance(&mut interaction, request_id, InteractionEvent::InputRejected)?;
                self.advance(&mut interaction, request_id, InteractionEvent::Reset)?;
                return Ok(Outcome::EmptyInput {
                    message: self.kind.empty_input_message(),
                });
            }
        };
        self.advance(&mut interaction, request_id, InteractionEvent::PromptBuilt)?;

        let generated = match self.client.resolve() {
            Some(client) => {
                AssertUnwindSafe(client.generate(prompt.as_str(), self.max_length))
                    .catch_unwind()
                    .await
            }
            None => {
                warn!("no generation client installed");
                Ok(Err(GenerationFailure::ShutDown))
            }
        };

        let outcome = match generated {
            Ok(Ok(text)) => {
                self.advance(
                    &mut interaction,
                    request_id,
                    InteractionEvent::GenerationSucceeded,
                )?;
                Outcome::Rendered {
                    heading: self.kind.result_heading(),
                    text,
                    acknowledgement: self.kind.success_acknowledgement(),
                }
            }
            Ok(Err(failure)) => {
                warn!(error = %failure, "generation failed");
                self.advance(&mut interaction, request_id, InteractionEvent::GenerationFailed)?;
                Outcome::generation_error()
            }
            Err(_) => {
                error!("generation panicked");
                self.advance(&mut interaction, request_id, InteractionEvent::GenerationFailed)?;
                Outcome::generation_error()
            }
        };

        self.advance(&mut interaction, request_id, InteractionEvent::Reset)?;
        Ok(outcome)
    }

    fn advance(
        &self,
        interaction: &mut Interaction,
        request_id: RequestId,
        event: InteractionEvent,
    ) -> InteractionResult<()> {
        let state = interaction.transition(event)?;
        self.observer.on_state(self.kind, request_id, state);
        Ok(())
    }
}

/// One controller per tab, sharing a single generation client.
#[derive(Clone, Debug)]
pub struct ControllerSet {
    qa: InteractionController,
    debug: InteractionController,
    learning_path: InteractionController,
    client: ClientHandle,
}

impl ControllerSet {
    /// Builds the three controllers with the supplied budget and observer.
    #[must_use]
    pub fn new(
        client: impl Into<ClientHandle>,
        max_length: u32,
        observer: Arc<dyn StatusObserver>,
    ) -> Self {
        let client = client.into();
        let prompts = Arc::new(PromptBuilder::new());
        let make = |kind| {
            InteractionController::new(kind, client.clone())
                .with_prompt_builder(Arc::clone(&prompts))
                .with_observer(Arc::clone(&observer))
                .with_max_length(max_length)
        };

        let qa = make(TaskKind::Qa);
        let debug = make(TaskKind::Debug);
        let learning_path = make(TaskKind::LearningPath);

        Self {
            qa,
            debug,
            learning_path,
            client,
        }
    }

    /// Builds controllers that use the client in the [`shared`](crate::shared)
    /// slot, so installing another client redirects every tab.
    #[must_use]
    pub fn shared(max_length: u32, observer: Arc<dyn StatusObserver>) -> Self {
        Self::new(ClientHandle::Shared, max_length, observer)
    }

    /// Returns the controller for `kind`.
    #[must_use]
    pub const fn controller(&self, kind: TaskKind) -> &InteractionController {
        match kind {
            TaskKind::Qa => &self.qa,
            TaskKind::Debug => &self.debug,
            TaskKind::LearningPath => &self.learning_path,
        }
    }

    /// Returns the generation client the tabs currently use.
    #[must_use]
    pub fn client(&self) -> Option<Arc<GenerationClient>> {
        self.client.resolve()
    }

    /// Routes a request to its tab's controller.
    pub async fn submit(&self, request: &TaskRequest) -> Outcome {
        self.controller(request.kind())
            .submit(request.clone())
            .await
    }
}
