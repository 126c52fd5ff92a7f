//! Normalized payload → domain entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use affect_core::{EmotionRecord, MultiEmotion};

use crate::ontology::{Emotion, Link, LinkKind};

/// An edge expressed by labels, before id resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLike {
    pub source: String,
    pub target: String,
    pub weight: f32,
    pub kind: LinkKind,
}

/// Nodes plus optional label-addressed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePayload {
    pub nodes: Vec<EmotionRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeLike>,
}

/// Emotions and links of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainGraph {
    pub emotions: Vec<Emotion>,
    pub links: Vec<Link>,
}

/// Map nodes to emotions and resolve edges against them.
///
/// Ids are `"{label}-0"`, so labels must be unique per payload: a repeated
/// label overwrites the earlier emotion in place. Edges whose endpoints are
/// not among the nodes are dropped.
pub fn map_to_domain(payload: &NodePayload) -> DomainGraph {
    let mut emotions: Vec<Emotion> = Vec::with_capacity(payload.nodes.len());
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for node in &payload.nodes {
        let emotion = Emotion::from(node);
        match by_id.get(&emotion.id) {
            Some(&slot) => {
                debug!(id = %emotion.id, "duplicate label overwrites earlier emotion");
                emotions[slot] = emotion;
            }
            None => {
                by_id.insert(emotion.id.clone(), emotions.len());
                emotions.push(emotion);
            }
        }
    }

    let by_label: HashMap<String, &str> = emotions
        .iter()
        .map(|e| (e.label.to_lowercase(), e.id.as_str()))
        .collect();

    let links = payload
        .edges
        .iter()
        .filter_map(|edge| {
            let source = by_label.get(&edge.source.to_lowercase());
            let target = by_label.get(&edge.target.to_lowercase());
            match (source, target) {
                (Some(source), Some(target)) => {
                    Some(Link::new(*source, *target, edge.kind, edge.weight))
                }
                _ => {
                    debug!(
                        source = %edge.source,
                        target = %edge.target,
                        "dropping edge with unknown endpoint"
                    );
                    None
                }
            }
        })
        .collect();

    DomainGraph { emotions, links }
}

/// Map a multi-emotion result; each pair becomes a co-occurrence edge
/// weighted by the partner's weight.
pub fn map_multi(multi: &MultiEmotion) -> DomainGraph {
    let weights: HashMap<&str, f32> = multi
        .emotions
        .iter()
        .map(|e| (e.label.as_str(), e.weight))
        .collect();

    let edges = multi
        .pairs
        .iter()
        .map(|(source, target)| EdgeLike {
            source: source.clone(),
            target: target.clone(),
            weight: weights.get(target.as_str()).copied().unwrap_or(0.0),
            kind: LinkKind::Cooccurrence,
        })
        .collect();

    map_to_domain(&NodePayload {
        nodes: multi.emotions.clone(),
        edges,
    })
}
