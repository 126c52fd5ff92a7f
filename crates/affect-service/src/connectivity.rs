//! Cross-cluster connectivity for final graphs.
//!
//! A graph whose links all stay inside one primary cluster (or that has no
//! links) gets one synthetic `semantic` link between the strongest pair of
//! emotions from different clusters.

use std::collections::HashMap;

use tracing::debug;

use affect_graph::{primary_cluster_of, Emotion, Link, LinkKind};

/// Candidate window: sources from the top 3, targets from the top 4.
const TOP_SOURCES: usize = 3;
const TOP_TARGETS: usize = 4;

fn cluster_key(emotion: &Emotion) -> Option<&'static str> {
    primary_cluster_of(&emotion.label).map(|c| c.key)
}

fn strength(emotion: &Emotion) -> f32 {
    emotion.strength().unwrap_or(0.0)
}

/// Emotions ordered by intensity (or score) descending; ties keep input order.
pub fn rank(emotions: &[Emotion]) -> Vec<&Emotion> {
    let mut ranked: Vec<&Emotion> = emotions.iter().collect();
    ranked.sort_by(|a, b| strength(b).total_cmp(&strength(a)));
    ranked
}

fn crosses(a: &Emotion, b: &Emotion) -> bool {
    matches!((cluster_key(a), cluster_key(b)), (Some(x), Some(y)) if x != y)
}

/// First pair in the top 3×4 window whose primary clusters differ, then the
/// first such pair among all ranked emotions.
pub fn find_cross_pair<'a>(ranked: &[&'a Emotion]) -> Option<(&'a Emotion, &'a Emotion)> {
    let n = ranked.len();
    let windowed = (0..n.min(TOP_SOURCES))
        .flat_map(|i| (i + 1..n.min(TOP_TARGETS)).map(move |j| (i, j)));
    let everything = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j)));

    windowed
        .chain(everything)
        .map(|(i, j)| (ranked[i], ranked[j]))
        .find(|(a, b)| crosses(a, b))
}

/// Whether any link joins two different primary clusters.
pub fn has_cross_cluster_link(emotions: &[Emotion], links: &[Link]) -> bool {
    let by_id: HashMap<&str, &Emotion> = emotions.iter().map(|e| (e.id.as_str(), e)).collect();
    links.iter().any(|link| {
        match (by_id.get(link.source.as_str()), by_id.get(link.target.as_str())) {
            (Some(a), Some(b)) => crosses(a, b),
            _ => false,
        }
    })
}

/// `semantic` link between two emotions, weighted by their strength.
pub fn synthetic_link(a: &Emotion, b: &Emotion) -> Link {
    let weight = (0.4 + (strength(a) + strength(b)) * 0.3).min(0.9);
    Link::new(&a.id, &b.id, LinkKind::Semantic, weight)
}

/// Add one cross-cluster link when there are at least two emotions and no
/// existing link crosses clusters. Returns the added link.
pub fn ensure_cross_cluster(emotions: &[Emotion], links: &mut Vec<Link>) -> Option<Link> {
    if emotions.len() < 2 || has_cross_cluster_link(emotions, links) {
        return None;
    }

    let ranked = rank(emotions);
    let (a, b) = find_cross_pair(&ranked)?;
    let link = synthetic_link(a, b);
    debug!(
        id = %link.id,
        weight = link.weight,
        rebalance = !links.is_empty(),
        "adding cross-cluster link"
    );
    links.push(link.clone());
    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emotion(label: &str, intensity: f32) -> Emotion {
        Emotion::new(label).with_intensity(intensity)
    }

    #[test]
    fn test_empty_links_get_connected() {
        let emotions = vec![emotion("joy", 0.8), emotion("pride", 0.7), emotion("fear", 0.5)];
        let mut links = Vec::new();
        let added = ensure_cross_cluster(&emotions, &mut links).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(added.id, "semantic|joy-0->fear-0");
        assert!((added.weight - 0.79).abs() < 1e-5);
    }

    #[test]
    fn test_weight_is_capped() {
        let link = synthetic_link(&emotion("joy", 1.0), &emotion("fear", 1.0));
        assert_eq!(link.weight, 0.9);
    }

    #[test]
    fn test_intra_cluster_links_are_rebalanced() {
        let emotions = vec![emotion("joy", 0.8), emotion("pride", 0.7), emotion("calm", 0.4)];
        let mut links = vec![Link::new("pride-0", "joy-0", LinkKind::Polarity, 0.6)];
        ensure_cross_cluster(&emotions, &mut links);

        assert_eq!(links.len(), 2);
        assert_eq!(links[1].kind, LinkKind::Semantic);
        assert!(has_cross_cluster_link(&emotions, &links));

        // Already balanced: nothing more is added.
        assert!(ensure_cross_cluster(&emotions, &mut links).is_none());
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_single_cluster_or_single_emotion_is_left_alone() {
        let mut links = Vec::new();
        assert!(ensure_cross_cluster(&[emotion("joy", 0.9)], &mut links).is_none());

        let same = vec![emotion("joy", 0.9), emotion("pride", 0.5), emotion("delight", 0.3)];
        assert!(ensure_cross_cluster(&same, &mut links).is_none());
        assert!(links.is_empty());
    }

    #[test]
    fn test_search_widens_past_window() {
        let emotions = vec![
            emotion("joy", 0.9),
            emotion("pride", 0.8),
            emotion("delight", 0.7),
            emotion("happiness", 0.6),
            emotion("excitement", 0.5),
            emotion("sadness", 0.1),
        ];
        let mut links = Vec::new();
        let added = ensure_cross_cluster(&emotions, &mut links).unwrap();
        assert_eq!(added.source, "joy-0");
        assert_eq!(added.target, "sadness-0");
    }

    #[test]
    fn test_rank_is_stable() {
        let emotions = vec![emotion("a", 0.5), emotion("b", 0.9), emotion("c", 0.5)];
        let labels: Vec<&str> = rank(&emotions).iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }
}
