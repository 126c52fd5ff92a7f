//! Dominant emotion → ranked multi-emotion set.

use std::collections::HashSet;

use crate::heuristic::template_for;
use crate::record::{
    clamp_signed, clamp_unit, finite, normalize_label, sanitize_colors, DominantEmotion,
    EmotionRecord, GlobalAffect, MultiEmotion, MAX_EMOTIONS,
};
use crate::{CoreError, Result};

/// Weight used when the dominant carries neither intensity nor score.
const DEFAULT_BASE_WEIGHT: f32 = 0.6;

/// Share of the base weight given to the first and last relation.
const RELATION_HEAD: f32 = 0.5;
const RELATION_SPAN: f32 = 0.25;

/// Expand a dominant emotion into at most [`MAX_EMOTIONS`] weighted records.
///
/// The dominant becomes the seed; each relation gets a weight decaying
/// linearly from 50% to 25% of the seed. Labels are deduplicated (first
/// wins), sorted by weight descending and joined in a star of `pairs`
/// around the root.
///
/// Only a label that normalizes to nothing is rejected.
pub fn expand(dominant: &DominantEmotion) -> Result<MultiEmotion> {
    let label = normalize_label(&dominant.label);
    if label.is_empty() {
        return Err(CoreError::MissingLabel(dominant.label.clone()));
    }

    let valence = finite(dominant.valence).map(clamp_signed);
    let arousal = finite(dominant.arousal).map(clamp_unit);
    let intensity = finite(dominant.intensity).map(clamp_unit);
    let score = finite(dominant.score).map(clamp_unit);
    let base = clamp_unit(intensity.or(score).unwrap_or(DEFAULT_BASE_WEIGHT));

    let relations: Vec<String> = dominant
        .relations
        .iter()
        .map(|r| normalize_label(r))
        .filter(|r| !r.is_empty())
        .take(MAX_EMOTIONS - 1)
        .collect();

    let seed = EmotionRecord {
        label,
        weight: base,
        valence,
        arousal,
        colors: sanitize_colors(&dominant.colors),
        intensity,
        relations: relations.clone(),
    };

    let mut emotions = Vec::with_capacity(relations.len() + 1);
    emotions.push(seed);

    let n = relations.len();
    let denom = n.saturating_sub(1).max(1) as f32;
    for (i, relation) in relations.into_iter().enumerate() {
        let share = RELATION_HEAD - RELATION_SPAN * (i as f32 / denom);
        emotions.push(relation_record(relation, clamp_unit(base * share)));
    }

    let mut seen = HashSet::new();
    emotions.retain(|e| seen.insert(e.label.clone()));

    // Vec::sort_by is stable, so equal weights keep insertion order.
    emotions.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    emotions.truncate(MAX_EMOTIONS);

    let pairs = star_pairs(&emotions);
    let global = GlobalAffect {
        valence: valence.unwrap_or(0.0),
        arousal: arousal.unwrap_or(0.5),
    };

    Ok(MultiEmotion {
        version: 1,
        emotions,
        global,
        pairs,
    })
}

/// Build a relation node, borrowing affect and colors from the catalog when the
/// label is known.
fn relation_record(label: String, weight: f32) -> EmotionRecord {
    let mut record = EmotionRecord::new(label, weight);
    if let Some(template) = template_for(&record.label) {
        record.valence = Some(template.valence);
        record.arousal = Some(template.arousal);
        record.colors = template.colors.iter().map(|c| c.to_string()).collect();
    }
    record
}

/// Root paired with every other label.
fn star_pairs(emotions: &[EmotionRecord]) -> Vec<(String, String)> {
    let root = emotions
        .first()
        .map(|e| e.label.as_str())
        .unwrap_or("neutral");
    emotions
        .iter()
        .skip(1)
        .map(|e| (root.to_string(), e.label.clone()))
        .collect()
}
