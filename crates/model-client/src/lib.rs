//! Model Client - remote emotion inference over a chat-completions API.
//!
//! This crate provides:
//! - A reqwest-based client with bearer auth and a request timeout
//! - The system prompt describing the multi-emotion envelope
//! - The `EmotionModel` seam the analysis service calls through
//!
//! Responses are returned as raw text; validation lives in `affect-core`.

pub mod client;
pub mod types;
pub mod prompt;

pub use client::{ClientError, EmotionModel, ModelClient, ModelConfig};
pub use types::{ChatMessage, ChatRequest, ChatResponse};
