//! Link merging and clustering.

use std::collections::HashMap;

use crate::catalog::{primary_cluster_of, PRIMARY_CLUSTERS};
use crate::ontology::{Emotion, Galaxy, Link};

/// Share of a duplicate link's weight folded into the first-seen link.
/// Tuning constant, not a probability combination.
const DUPLICATE_DISCOUNT: f32 = 0.5;

/// Valence threshold separating the neutral bucket from the others.
const VALENCE_BAND: f32 = 0.25;

/// Merge link lists, deduplicating by `(source, target, kind)`.
///
/// Lists are flattened in order. The first link seen for a key keeps its id
/// and position; every later duplicate adds half its weight, capped at 1.
/// This is order-dependent and not idempotent: merging a list with itself
/// yields `min(1, w * 1.5)`.
pub fn merge_links(lists: &[&[Link]]) -> Vec<Link> {
    let mut merged: Vec<Link> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for link in lists.iter().flat_map(|list| list.iter()) {
        let key = link.merge_key();
        match index.get(&key) {
            Some(&slot) => {
                let existing = &mut merged[slot];
                existing.weight = (existing.weight + link.weight * DUPLICATE_DISCOUNT).min(1.0);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(link.clone());
            }
        }
    }

    merged
}

/// Group emotions into negative, neutral and positive galaxies.
///
/// Always returns the three galaxies in that order, possibly empty. Unknown
/// valence counts as neutral.
pub fn cluster_by_valence(emotions: &[Emotion]) -> Vec<Galaxy> {
    let mut negative = Vec::new();
    let mut neutral = Vec::new();
    let mut positive = Vec::new();

    for emotion in emotions {
        let valence = emotion.valence.unwrap_or(0.0);
        if valence < -VALENCE_BAND {
            negative.push(emotion.id.clone());
        } else if valence > VALENCE_BAND {
            positive.push(emotion.id.clone());
        } else {
            neutral.push(emotion.id.clone());
        }
    }

    vec![
        valence_galaxy("negative", "Negative", "#5C6BC0", negative),
        valence_galaxy("neutral", "Neutral", "#B0BEC5", neutral),
        valence_galaxy("positive", "Positive", "#FFD54F", positive),
    ]
}

fn valence_galaxy(id: &str, name: &str, color: &str, members: Vec<String>) -> Galaxy {
    Galaxy {
        id: id.to_string(),
        name: name.to_string(),
        members,
        color_hex: color.to_string(),
        centroid: None,
        radius: None,
    }
}

/// Group emotions by primary cluster.
///
/// Emotions whose label has no primary cluster are left out. Only non-empty
/// galaxies are returned, in catalog order.
pub fn cluster_by_primaries(emotions: &[Emotion]) -> Vec<Galaxy> {
    let mut members: HashMap<&'static str, Vec<String>> = HashMap::new();
    for emotion in emotions {
        if let Some(cluster) = primary_cluster_of(&emotion.label) {
            members.entry(cluster.key).or_default().push(emotion.id.clone());
        }
    }

    PRIMARY_CLUSTERS
        .iter()
        .filter_map(|cluster| {
            members.remove(cluster.key).map(|members| Galaxy {
                id: format!("galaxy-{}", cluster.key),
                name: cluster.name.to_string(),
                members,
                color_hex: cluster.color_hex.to_string(),
                centroid: Some(cluster.centroid),
                radius: Some(cluster.radius),
            })
        })
        .collect()
}
