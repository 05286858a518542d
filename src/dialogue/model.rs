//! Request and result types for the dialogue flows.
//!
//! Wire bodies (`*Body`) are deserialized leniently: every field is optional
//! so that a missing field becomes a typed `MissingFields` error instead of a
//! serde rejection. Typed requests are built from them with `TryFrom`, which
//! is the only place required-field validation happens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DialogueError;

/// Marker substituted for an absent narrative.
pub const NO_NARRATIVE: &str = "none";

/// Flatten a story log into one text blob.
///
/// Clients send the log as a string, a list of entries, or occasionally any
/// other JSON value; everything except `null` is kept as opaque text. List
/// entries are separated by newlines.
fn log_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .map(|entry| match entry {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}

/// Body of `POST /summary`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBody {
    pub log_prompts: Option<Value>,
    pub nickname: Option<String>,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnBody {
    pub log_prompts: Option<Value>,
    pub user_prompt: Option<String>,
    pub nickname: Option<String>,
}

/// Body of `POST /complete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionBody {
    pub prompt: Option<String>,
}

/// Returns the value if it holds anything besides whitespace.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Narrative so far plus the name the user goes by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeContext {
    narrative: Option<String>,
    display_name: String,
}

impl NarrativeContext {
    pub fn new(narrative: Option<String>, display_name: impl Into<String>) -> Self {
        Self {
            narrative: present(narrative),
            display_name: display_name.into(),
        }
    }

    /// The narrative, or [`NO_NARRATIVE`] when there is none.
    pub fn narrative_or_none(&self) -> &str {
        self.narrative.as_deref().unwrap_or(NO_NARRATIVE)
    }

    pub fn has_narrative(&self) -> bool {
        self.narrative.is_some()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Validated input for the summary flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub context: NarrativeContext,
}

impl TryFrom<SummaryBody> for SummaryRequest {
    type Error = DialogueError;

    fn try_from(body: SummaryBody) -> Result<Self, Self::Error> {
        let narrative = present(body.log_prompts.and_then(log_text));
        let nickname = present(body.nickname);

        match (narrative, nickname) {
            (Some(narrative), Some(nickname)) => Ok(Self {
                context: NarrativeContext::new(Some(narrative), nickname),
            }),
            (narrative, nickname) => {
                let mut missing = Vec::new();
                if narrative.is_none() {
                    missing.push("logPrompts");
                }
                if nickname.is_none() {
                    missing.push("nickname");
                }
                Err(DialogueError::MissingFields(missing))
            }
        }
    }
}

/// Validated input for the guided turn flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub context: NarrativeContext,
    pub answer: String,
}

impl TryFrom<TurnBody> for TurnRequest {
    type Error = DialogueError;

    fn try_from(body: TurnBody) -> Result<Self, Self::Error> {
        let answer = present(body.user_prompt);
        let nickname = present(body.nickname);

        match (answer, nickname) {
            (Some(answer), Some(nickname)) => Ok(Self {
                context: NarrativeContext::new(
                    body.log_prompts.and_then(log_text),
                    nickname,
                ),
                answer,
            }),
            (answer, nickname) => {
                let mut missing = Vec::new();
                if answer.is_none() {
                    missing.push("userPrompt");
                }
                if nickname.is_none() {
                    missing.push("nickname");
                }
                Err(DialogueError::MissingFields(missing))
            }
        }
    }
}

/// Validated input for the raw completion flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt(String);

impl CompletionPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<CompletionBody> for CompletionPrompt {
    type Error = DialogueError;

    fn try_from(body: CompletionBody) -> Result<Self, Self::Error> {
        present(body.prompt)
            .map(Self)
            .ok_or_else(|| DialogueError::MissingFields(vec!["prompt"]))
    }
}

/// Prompt text ready to send to the model. Never mutated after composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Mood the UI mascot shows for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Happy,
    Sad,
}

impl Expression {
    pub const ALL: [Expression; 2] = [Expression::Happy, Expression::Sad];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expression {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or(())
    }
}

/// One decoded conversational turn. Only ever constructed fully valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueTurn {
    pub expression: Expression,
    pub follow_up_question: String,
    pub feedback: String,
}

/// Which orchestration path a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Summary,
    GuidedTurn,
    RawCompletion,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summary => "summary",
            Self::GuidedTurn => "guided_turn",
            Self::RawCompletion => "raw_completion",
        };
        f.write_str(name)
    }
}
