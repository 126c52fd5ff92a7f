//! Emotion record types shared by the classifier, expander and validator.

use serde::{Deserialize, Serialize};

/// Upper bound on records in one multi-emotion result.
pub const MAX_EMOTIONS: usize = 8;

/// Single dominant emotion, as inferred from text or returned by a model.
///
/// Optional numeric fields mean "unknown", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantEmotion {
    /// Normalized label (`[a-z0-9_]+`).
    pub label: String,
    /// Classifier confidence [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Valence [-1, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f32>,
    /// Arousal [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f32>,
    /// Display colors, `#RRGGBB`, primary first.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Visual strength hint [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    /// Suggested secondary labels, most related first.
    #[serde(default)]
    pub relations: Vec<String>,
}

impl DominantEmotion {
    /// Create a record carrying only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            score: None,
            valence: None,
            arousal: None,
            colors: Vec::new(),
            intensity: None,
            relations: Vec::new(),
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_affect(mut self, valence: f32, arousal: f32) -> Self {
        self.valence = Some(valence);
        self.arousal = Some(arousal);
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations = relations.into_iter().map(Into::into).collect();
        self
    }
}

/// One weighted entry of a multi-emotion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionRecord {
    pub label: String,
    /// Relative prominence [0, 1]; used for ordering only.
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
}

impl EmotionRecord {
    pub fn new(label: impl Into<String>, weight: f32) -> Self {
        Self {
            label: label.into(),
            weight: clamp_unit(weight),
            valence: None,
            arousal: None,
            colors: Vec::new(),
            intensity: None,
            relations: Vec::new(),
        }
    }
}

/// Aggregate affect of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalAffect {
    pub valence: f32,
    pub arousal: f32,
}

impl Default for GlobalAffect {
    fn default() -> Self {
        Self { valence: 0.0, arousal: 0.5 }
    }
}

/// Ranked multi-emotion result (at most [`MAX_EMOTIONS`] entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiEmotion {
    pub version: u32,
    /// Sorted by weight, descending.
    pub emotions: Vec<EmotionRecord>,
    pub global: GlobalAffect,
    /// Co-occurrence pairs by label.
    pub pairs: Vec<(String, String)>,
}

impl MultiEmotion {
    /// Highest-weighted record, if any.
    pub fn root(&self) -> Option<&EmotionRecord> {
        self.emotions.first()
    }
}

/// Lowercase, trim, and collapse whitespace runs to `_`.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether a label satisfies `^[a-z0-9_]+$`.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Whether `s` is a `#RRGGBB` color.
pub fn is_hex_color(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

/// Keep only well-formed hex colors, in order.
pub fn sanitize_colors(colors: &[String]) -> Vec<String> {
    colors.iter().filter(|c| is_hex_color(c)).cloned().collect()
}

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Clamp to [-1, 1]; NaN maps to 0.
pub fn clamp_signed(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

/// Drop non-finite values so they read as "unknown".
pub(crate) fn finite(v: Option<f32>) -> Option<f32> {
    v.filter(|x| x.is_finite())
}
