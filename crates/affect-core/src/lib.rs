//! Affect Core - text to weighted emotion records.
//!
//! This crate provides:
//! - A priority-cascade heuristic classifier (keywords and emoji)
//! - Expansion of one dominant emotion into a ranked multi-emotion set
//! - Strict and permissive parsing of untrusted model responses
//!
//! Everything here is synchronous and free of shared state.

pub mod record;
pub mod heuristic;
pub mod expander;
pub mod payload;

pub use record::{DominantEmotion, EmotionRecord, GlobalAffect, MultiEmotion, MAX_EMOTIONS};
pub use heuristic::{Classifier, HeuristicClassifier};
pub use expander::expand;
pub use payload::{parse_response, ParsedPayload, PayloadError};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Emotion record has no usable label: {0:?}")]
    MissingLabel(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
