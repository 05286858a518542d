//! Structured dialogue turns for the Mochi companion.
//!
//! Requests flow through three stages: the prompt composer renders a
//! persona- and stage-aware prompt, the model provider returns raw text, and
//! (for guided turns) the decoder validates it against the turn schema.
//! `DialogueGenerator` runs those stages; `routes` exposes them over HTTP.

pub mod decoder;
pub mod generator;
pub mod model;
pub mod prompts;
pub mod routes;

pub use decoder::decode_turn;
pub use generator::{DialogueGenerator, GeneratorConfig};
pub use model::{
    CompletionPrompt, ComposedPrompt, DialogueTurn, Expression, FlowKind, NarrativeContext,
    SummaryRequest, TurnRequest,
};
pub use routes::{DialogueRouteState, dialogue_routes};
