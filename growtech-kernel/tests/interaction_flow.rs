use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use growtech_adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};
use growtech_kernel::{
    ClientConfig, CollectingObserver, ControllerSet, DEFAULT_MAX_LENGTH, GENERIC_FAILURE_MESSAGE,
    GenerationClient, InteractionController, InteractionState, Outcome,
};
use growtech_primitives::{SkillLevel, TaskKind, TaskRequest};
use growtech_prompts::TUTOR_PREAMBLE;
use serde_json::json;

enum Behaviour {
    Echo,
    Fail,
    Blank,
    Sleep(Duration),
    Panic,
}

struct ScriptedBackend {
    metadata: AdapterMetadata,
    behaviour: Behaviour,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, u32)>>,
}

impl ScriptedBackend {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            metadata: AdapterMetadata::new("test", "scripted"),
            behaviour,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen(&self) -> Vec<(String, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn generate(&self, request: GenerationRequest) -> AdapterResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((request.prompt().to_owned(), request.max_length()));

        match &self.behaviour {
            Behaviour::Echo => Ok(format!("echo: {}", request.prompt())),
            Behaviour::Fail => Err(AdapterError::transport("connection refused")),
            Behaviour::Blank => Ok("   \n".to_owned()),
            Behaviour::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("late".to_owned())
            }
            Behaviour::Panic => panic!("model exploded"),
        }
    }
}

fn client_for(backend: &Arc<ScriptedBackend>, config: ClientConfig) -> Arc<GenerationClient> {
    Arc::new(GenerationClient::with_backend(
        Arc::clone(backend) as Arc<dyn GenerationBackend>,
        config,
    ))
}

fn states(observer: &CollectingObserver) -> Vec<InteractionState> {
    observer.drain().into_iter().map(|(_, state)| state).collect()
}

#[tokio::test]
async fn empty_input_never_reaches_the_model() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let observer = CollectingObserver::new();
    let set = ControllerSet::new(
        client_for(&backend, ClientConfig::default()),
        DEFAULT_MAX_LENGTH,
        observer.clone(),
    );

    for kind in TaskKind::ALL {
        for text in ["", "   ", "\n\t "] {
            let outcome = set
                .submit(&TaskRequest::new(kind, text).with_skill_level(SkillLevel::Advanced))
                .await;
            assert_eq!(
                outcome,
                Outcome::EmptyInput {
                    message: kind.empty_input_message()
                }
            );
            assert_eq!(
                states(&observer),
                vec![
                    InteractionState::Validating,
                    InteractionState::EmptyInputError,
                    InteractionState::Idle,
                ]
            );
        }
    }

    assert_eq!(backend.calls(), 0);
    assert!(!set.client().unwrap().is_loaded());
}

#[tokio::test]
async fn qa_success_renders_answer() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let observer = CollectingObserver::new();
    let controller = InteractionController::new(
        TaskKind::Qa,
        client_for(&backend, ClientConfig::default()),
    )
    .with_observer(observer.clone());

    let outcome = controller
        .submit(TaskRequest::new(TaskKind::Qa, "Explain Python loops"))
        .await;

    let expected_prompt = format!("{TUTOR_PREAMBLE}Explain Python loops");
    assert_eq!(
        outcome,
        Outcome::Rendered {
            heading: "Answer",
            text: format!("echo: {expected_prompt}"),
            acknowledgement: TaskKind::Qa.success_acknowledgement(),
        }
    );
    assert_eq!(backend.seen(), vec![(expected_prompt, 300)]);
    assert_eq!(
        states(&observer),
        vec![
            InteractionState::Validating,
            InteractionState::Building,
            InteractionState::Generating,
            InteractionState::Rendered,
            InteractionState::Idle,
        ]
    );
}

#[tokio::test]
async fn debug_and_learning_path_prompts_reach_the_model_verbatim() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let set = ControllerSet::new(
        client_for(&backend, ClientConfig::default()),
        DEFAULT_MAX_LENGTH,
        CollectingObserver::new(),
    );

    set.submit(&TaskRequest::new(TaskKind::Debug, "print(x[5])"))
        .await;
    set.submit(
        &TaskRequest::new(TaskKind::LearningPath, "Learn Python")
            .with_skill_level(SkillLevel::Beginner),
    )
    .await;

    let prompts: Vec<String> = backend.seen().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        prompts,
        vec![
            "Debug this code and explain errors in simple terms: print(x[5])".to_owned(),
            "Suggest a 4-week learning path for a beginner to achieve: Learn Python".to_owned(),
        ]
    );
}

#[tokio::test]
async fn backend_error_yields_one_generic_failure() {
    let backend = ScriptedBackend::new(Behaviour::Fail);
    let observer = CollectingObserver::new();
    let set = ControllerSet::new(
        client_for(&backend, ClientConfig::default()),
        DEFAULT_MAX_LENGTH,
        observer.clone(),
    );

    for kind in TaskKind::ALL {
        let outcome = set.submit(&TaskRequest::new(kind, "something")).await;
        assert_eq!(
            outcome,
            Outcome::GenerationError {
                message: GENERIC_FAILURE_MESSAGE
            }
        );
        let seen = states(&observer);
        assert_eq!(
            seen.iter()
                .filter(|s| **s == InteractionState::GenerationError)
                .count(),
            1
        );
        assert_eq!(seen.last(), Some(&InteractionState::Idle));
    }
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn raw_error_text_is_never_shown() {
    let backend = ScriptedBackend::new(Behaviour::Fail);
    let controller = InteractionController::new(
        TaskKind::Debug,
        client_for(&backend, ClientConfig::default()),
    );

    let outcome = controller.submit(TaskRequest::new(TaskKind::Debug, "x = ")).await;
    let body = serde_json::to_string(&outcome).unwrap();
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn blank_model_output_is_a_failure() {
    let backend = ScriptedBackend::new(Behaviour::Blank);
    let controller = InteractionController::new(
        TaskKind::Qa,
        client_for(&backend, ClientConfig::default()),
    );

    let outcome = controller.submit(TaskRequest::new(TaskKind::Qa, "hi")).await;
    assert_eq!(outcome.state(), InteractionState::GenerationError);
}

#[tokio::test]
async fn slow_model_times_out() {
    let backend = ScriptedBackend::new(Behaviour::Sleep(Duration::from_secs(5)));
    let controller = InteractionController::new(
        TaskKind::LearningPath,
        client_for(&backend, ClientConfig::new(Duration::from_millis(50))),
    );

    let outcome = controller
        .submit(
            TaskRequest::new(TaskKind::LearningPath, "Learn Go")
                .with_skill_level(SkillLevel::Intermediate),
        ).await;
    assert_eq!(outcome.state(), InteractionState::GenerationError);
}

#[tokio::test]
async fn panicking_model_is_contained() {
    let backend = ScriptedBackend::new(Behaviour::Panic);
    let controller = InteractionController::new(
        TaskKind::Debug,
        client_for(&backend, ClientConfig::default()),
    );

    let outcome = controller.submit(TaskRequest::new(TaskKind::Debug, "1/0")).await;
    assert_eq!(
        outcome,
        Outcome::GenerationError {
            message: GENERIC_FAILURE_MESSAGE
        }
    );

    // The session keeps working after the failure.
    let outcome = controller.submit(TaskRequest::new(TaskKind::Debug, "1/0")).await;
    assert_eq!(outcome.state(), InteractionState::GenerationError);
}

#[tokio::test]
async fn controller_handles_request_as_its_own_tab() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let controller = InteractionController::new(
        TaskKind::Debug,
        client_for(&backend, ClientConfig::default()),
    );

    let outcome = controller
        .submit(TaskRequest::new(TaskKind::Qa, "print(x[5])"))
        .await;

    assert_eq!(
        backend.seen()[0].0,
        "Debug this code and explain errors in simple terms: print(x[5])"
    );
    assert!(matches!(outcome, Outcome::Rendered { heading: "Debug Report", .. }));
}

#[tokio::test]
async fn custom_budget_is_forwarded() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let set = ControllerSet::new(
        client_for(&backend, ClientConfig::default()),
        120,
        CollectingObserver::new(),
    );

    set.submit(&TaskRequest::new(TaskKind::Qa, "a")).await;
    set.submit(&TaskRequest::new(TaskKind::Debug, "b")).await;
    assert!(backend.seen().iter().all(|(_, len)| *len == 120));
    assert_eq!(set.controller(TaskKind::LearningPath).max_length(), 120);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_keep_their_own_results() {
    let backend = ScriptedBackend::new(Behaviour::Echo);
    let set = Arc::new(ControllerSet::new(
        client_for(
            &backend,
            ClientConfig::default().with_max_concurrent(std::num::NonZeroUsize::new(4).unwrap()),
        ),
        DEFAULT_MAX_LENGTH,
        CollectingObserver::new(),
    ));

    let mut handles = Vec::new();
    for i in 0..24 {
        let set = Arc::clone(&set);
        let kind = TaskKind::ALL[i % 3];
        handles.push(tokio::spawn(async move {
            let text = format!("session-{i}");
            let outcome = set.submit(&TaskRequest::new(kind, text.clone())).await;
            (text, outcome)
        }));
    }

    for handle in handles {
        let (text, outcome) = handle.await.unwrap();
        let rendered = outcome.text().expect("rendered");
        assert!(rendered.ends_with(&text), "{rendered} should end with {text}");
    }
    assert_eq!(backend.calls(), 24);
}

#[test]
fn outcome_serializes_with_status_tag() {
    let outcome = Outcome::Rendered {
        heading: "Answer",
        text: "loops repeat".to_owned(),
        acknowledgement: "Done!",
    };
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "status": "rendered",
            "heading": "Answer",
            "text": "loops repeat",
            "acknowledgement": "Done!"
        })
    );

    let outcome = Outcome::EmptyInput {
        message: "Please enter a question!",
    };
    assert_eq!(
        serde_json::to_value(&outcome).unwrap()["status"],
        "empty_input"
    );
}
