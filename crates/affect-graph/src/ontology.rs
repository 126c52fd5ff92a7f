//! Domain types for the emotion graph.

use serde::{Deserialize, Serialize};

use affect_core::EmotionRecord;

/// Passthrough values not promoted to first-class fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
}

/// An emotion node in one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    /// `"{label}-0"`; unique within one analysis, not across analyses.
    pub id: String,
    pub label: String,
    pub valence: Option<f32>,
    pub arousal: Option<f32>,
    pub intensity: Option<f32>,
    /// Primary display color.
    pub color_hex: Option<String>,
    #[serde(default)]
    pub meta: EmotionMeta,
}

impl Emotion {
    /// Deterministic id for a label.
    pub fn id_for(label: &str) -> String {
        format!("{label}-0")
    }

    /// Create an emotion carrying only a label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: Self::id_for(&label),
            label,
            valence: None,
            arousal: None,
            intensity: None,
            color_hex: None,
            meta: EmotionMeta::default(),
        }
    }

    /// Set valence and arousal.
    pub fn with_affect(mut self, valence: f32, arousal: f32) -> Self {
        self.valence = Some(valence);
        self.arousal = Some(arousal);
        self
    }

    /// Set intensity.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Strength used for ranking: intensity, then score.
    pub fn strength(&self) -> Option<f32> {
        self.intensity.or(self.meta.score)
    }
}

impl From<&EmotionRecord> for Emotion {
    fn from(record: &EmotionRecord) -> Self {
        Self {
            id: Self::id_for(&record.label),
            label: record.label.clone(),
            valence: record.valence,
            arousal: record.arousal,
            intensity: record.intensity,
            color_hex: record.colors.first().cloned(),
            meta: EmotionMeta {
                score: Some(record.weight),
                colors: record.colors.clone(),
                relations: record.relations.clone(),
            },
        }
    }
}

/// Types of links between emotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Plausible shift from one state to another (fear → calm).
    Transition,
    /// Expansive, contractive or bridging pair (joy ↔ love).
    Polarity,
    /// Two emotions jointly giving rise to a third (fear + love → guilt).
    Cause,
    /// Shared adaptive purpose (fear protects, anger defends).
    Function,
    /// Synthetic link added to keep clusters connected.
    Semantic,
    /// Emotions reported together by the classifier or model.
    Cooccurrence,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transition => "transition",
            Self::Polarity => "polarity",
            Self::Cause => "cause",
            Self::Function => "function",
            Self::Semantic => "semantic",
            Self::Cooccurrence => "cooccurrence",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weighted, typed link between two emotion ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// `"{kind}|{source}->{target}"`.
    pub id: String,
    pub source: String,
    pub target: String,
    /// Strength [0, 1].
    pub weight: f32,
    pub kind: LinkKind,
}

impl Link {
    /// Create a link; weight is clamped to [0, 1].
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: LinkKind,
        weight: f32,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{kind}|{source}->{target}"),
            source,
            target,
            weight: if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) },
            kind,
        }
    }

    /// Identity used when merging: endpoints plus kind.
    pub fn merge_key(&self) -> String {
        format!("{}|{}|{}", self.source, self.target, self.kind)
    }
}

/// A named group of emotions for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Galaxy {
    pub id: String,
    pub name: String,
    /// Member emotion ids.
    pub members: Vec<String>,
    pub color_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_identity() {
        let link = Link::new("fear-0", "calm-0", LinkKind::Transition, 1.3);
        assert_eq!(link.id, "transition|fear-0->calm-0");
        assert_eq!(link.merge_key(), "fear-0|calm-0|transition");
        assert_eq!(link.weight, 1.0);
    }

    #[test]
    fn test_emotion_from_record() {
        let mut record = EmotionRecord::new("joy", 0.8);
        record.colors = vec!["#FFD54F".into(), "#FFB300".into()];
        record.valence = Some(0.8);

        let emotion = Emotion::from(&record);
        assert_eq!(emotion.id, "joy-0");
        assert_eq!(emotion.color_hex.as_deref(), Some("#FFD54F"));
        assert_eq!(emotion.meta.score, Some(0.8));
        assert_eq!(emotion.strength(), Some(0.8));
        assert_eq!(emotion.arousal, None);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&LinkKind::Cooccurrence).unwrap();
        assert_eq!(json, "\"cooccurrence\"");
    }
}
