//! Affect Graph - weighted emotion graphs for visualization.
//!
//! This crate provides:
//! - Domain entities (Emotion, Link, Galaxy) with deterministic ids
//! - Mapping of normalized payloads into domain entities
//! - Fixed semantic energy rules (polarity, transition, cause, function)
//! - Link merging and clustering by valence or primary cluster

pub mod ontology;
pub mod catalog;
pub mod mapper;
pub mod energy;
pub mod graph;

pub use ontology::{Emotion, EmotionMeta, Galaxy, Link, LinkKind};
pub use catalog::{primary_cluster_of, PrimaryCluster, PRIMARY_CLUSTERS};
pub use mapper::{map_multi, map_to_domain, DomainGraph, EdgeLike, NodePayload};
pub use energy::{EnergyEngine, EnergyRule};
pub use graph::{cluster_by_primaries, cluster_by_valence, merge_links};
