//! Mochi backend — persona-constrained dialogue turns from a generative model.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod llm;
pub mod server;
