//! Affect Service - end-to-end text → emotion graph analysis.
//!
//! This crate provides:
//! - Mode selection between the local heuristic and a remote model
//! - Transparent fallback to the heuristic chain on any remote failure
//! - Energy-rule enrichment, link merging and clustering
//! - Cross-cluster connectivity guarantees on the final graph

pub mod config;
pub mod outcome;
pub mod connectivity;
pub mod service;

pub use config::{AnalysisMode, ClusterStrategy, ConfigError, Route, ServiceConfig};
pub use outcome::{FallbackReason, Resolved};
pub use service::{EmotionGraph, EmotionService};
