//! Dialogue generator — one orchestration path for every flow.
//!
//! Each flow composes a prompt, sends it through [`DialogueGenerator::invoke`]
//! under a deadline, and (for guided turns) decodes the reply. Provider
//! failures are logged in full here and surfaced as a single generation error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_GENERATION_TIMEOUT;
use crate::error::DialogueError;
use crate::llm::provider::{CompletionRequest, LlmProvider};

use super::decoder::decode_turn;
use super::model::{
    CompletionPrompt, ComposedPrompt, DialogueTurn, FlowKind, SummaryRequest, TurnRequest,
};
use super::prompts::{guided_turn_prompt, summary_prompt};

/// Configuration for dialogue generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Deadline for a single model call.
    pub timeout: Duration,
    /// LLM temperature, provider default when `None`.
    pub temperature: Option<f32>,
    /// Max tokens for the LLM response, provider default when `None`.
    pub max_tokens: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GENERATION_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Produces summaries, guided turns and raw completions from an injected provider.
pub struct DialogueGenerator {
    llm: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
}

impl DialogueGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self { llm, config }
    }

    /// Summary flow: the model text is returned verbatim.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, DialogueError> {
        let prompt = summary_prompt(request);
        self.invoke(FlowKind::Summary, prompt).await
    }

    /// Guided turn flow: the model text must decode into a [`DialogueTurn`].
    pub async fn next_turn(&self, request: &TurnRequest) -> Result<DialogueTurn, DialogueError> {
        let prompt = guided_turn_prompt(request);
        let raw = self.invoke(FlowKind::GuidedTurn, prompt).await?;

        match decode_turn(&raw) {
            Ok(turn) => {
                debug!(expression = %turn.expression, "Decoded dialogue turn");
                Ok(turn)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    raw = %e.raw,
                    "Model reply did not match the dialogue turn schema"
                );
                Err(e.into())
            }
        }
    }

    /// Raw completion flow: the caller's prompt goes to the model untouched.
    pub async fn complete_raw(&self, prompt: &CompletionPrompt) -> Result<String, DialogueError> {
        let prompt = ComposedPrompt::new(prompt.as_str().to_string());
        self.invoke(FlowKind::RawCompletion, prompt).await
    }

    /// Send one prompt to the model under the configured deadline.
    async fn invoke(&self, kind: FlowKind, prompt: ComposedPrompt) -> Result<String, DialogueError> {
        info!(
            flow = %kind,
            model = self.llm.model_name(),
            prompt_bytes = prompt.as_str().len(),
            "Invoking model"
        );

        let mut request = CompletionRequest::new(prompt.into_string());
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        // Dropping the pending future on expiry cancels the provider call.
        match tokio::time::timeout(self.config.timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => {
                info!(
                    flow = %kind,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "Model responded"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                error!(flow = %kind, error = %e, "Model call failed");
                Err(DialogueError::Generation(e))
            }
            Err(_) => {
                error!(flow = %kind, timeout = ?self.config.timeout, "Model call timed out");
                Err(DialogueError::Timeout(self.config.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::dialogue::model::{Expression, NarrativeContext};
    use crate::error::{DecodeFailure, LlmError};
    use crate::llm::provider::CompletionResponse;

    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    /// Stub provider that records prompts and answers per `Behavior`.
    struct StubLlm {
        behavior: Behavior,
        prompts: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt);

            match self.behavior {
                Behavior::Reply(text) => Ok(CompletionResponse {
                    content: text.to_string(),
                    input_tokens: 0,
                    output_tokens: 0,
                }),
                Behavior::Fail => Err(LlmError::RequestFailed {
                    provider: "stub".to_string(),
                    reason: "quota exceeded".to_string(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    unreachable!("deadline should fire first")
                }
            }
        }
    }

    fn generator(llm: Arc<StubLlm>) -> DialogueGenerator {
        DialogueGenerator::new(
            llm,
            GeneratorConfig {
                timeout: Duration::from_millis(100),
                ..Default::default()
            },
        )
    }

    fn turn_request() -> TurnRequest {
        TurnRequest {
            context: NarrativeContext::new(None, "Kai"),
            answer: "I aced my exam".to_string(),
        }
    }

    #[tokio::test]
    async fn summarize_passes_text_through() {
        let llm = StubLlm::new(Behavior::Reply("  Kai had a big day.  "));
        let generator = generator(Arc::clone(&llm));
        let request = SummaryRequest {
            context: NarrativeContext::new(Some("went to the beach".into()), "Kai"),
        };

        let text = generator.summarize(&request).await.unwrap();
        assert_eq!(text, "  Kai had a big day.  ");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], summary_prompt(&request).into_string());
    }

    #[tokio::test]
    async fn next_turn_decodes_reply() {
        let llm = StubLlm::new(Behavior::Reply(
            r#"{"expression":"happy","follow_up_question":"How did you celebrate?","feedback":"Nice work!"}"#,
        ));
        let turn = generator(llm).next_turn(&turn_request()).await.unwrap();
        assert_eq!(turn.expression, Expression::Happy);
        assert_eq!(turn.follow_up_question, "How did you celebrate?");
    }

    #[tokio::test]
    async fn next_turn_sends_none_marker_for_missing_log() {
        let llm = StubLlm::new(Behavior::Reply(
            r#"{"expression":"sad","follow_up_question":"q","feedback":"f"}"#,
        ));
        generator(Arc::clone(&llm))
            .next_turn(&turn_request())
            .await
            .unwrap();
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("STORY SO FAR:\nnone\n"));
    }

    #[tokio::test]
    async fn next_turn_invalid_json_keeps_raw() {
        let llm = StubLlm::new(Behavior::Reply("I cannot answer that."));
        let err = generator(llm).next_turn(&turn_request()).await.unwrap_err();
        match err {
            DialogueError::InvalidModelOutput(e) => {
                assert_eq!(e.raw, "I cannot answer that.");
                assert!(matches!(e.failure, DecodeFailure::Syntax(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_is_generation_error() {
        let err = generator(StubLlm::new(Behavior::Fail))
            .next_turn(&turn_request())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::Generation(_)));
    }

    #[tokio::test]
    async fn hung_provider_times_out() {
        let err = generator(StubLlm::new(Behavior::Hang))
            .complete_raw(&CompletionPrompt::try_from(
                crate::dialogue::model::CompletionBody {
                    prompt: Some("hello".into()),
                },
            )
            .unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn complete_raw_sends_prompt_verbatim() {
        let llm = StubLlm::new(Behavior::Reply("pong"));
        let prompt = CompletionPrompt::try_from(crate::dialogue::model::CompletionBody {
            prompt: Some("ping".into()),
        })
        .unwrap();
        let text = generator(Arc::clone(&llm)).complete_raw(&prompt).await.unwrap();
        assert_eq!(text, "pong");
        assert_eq!(llm.prompts.lock().unwrap()[0], "ping");
    }
}
