//! Local heuristic classifier.
//!
//! Text is matched against an ordered list of keyword/emoji patterns, one per
//! label. The first pattern that matches decides the emotion; there is no
//! scoring across patterns. Each label resolves to a fixed template.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::record::DominantEmotion;

/// Static description of one emotion label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionTemplate {
    pub label: &'static str,
    pub score: f32,
    pub valence: f32,
    pub arousal: f32,
    pub colors: &'static [&'static str],
    pub intensity: f32,
    pub relations: &'static [&'static str],
}

impl EmotionTemplate {
    /// Materialize the template as a dominant emotion.
    pub fn to_dominant(&self) -> DominantEmotion {
        DominantEmotion {
            label: self.label.to_string(),
            score: Some(self.score),
            valence: Some(self.valence),
            arousal: Some(self.arousal),
            colors: self.colors.iter().map(|c| c.to_string()).collect(),
            intensity: Some(self.intensity),
            relations: self.relations.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Returned for empty input.
pub const EMPTY_NEUTRAL: EmotionTemplate = EmotionTemplate {
    label: "neutral",
    score: 1.0,
    valence: 0.0,
    arousal: 0.2,
    colors: &["#B0BEC5"],
    intensity: 0.1,
    relations: &[],
};

/// Returned when text is present but nothing matches.
pub const UNMATCHED_NEUTRAL: EmotionTemplate = EmotionTemplate {
    label: "neutral",
    score: 0.6,
    valence: 0.0,
    arousal: 0.3,
    colors: &["#B0BEC5"],
    intensity: 0.2,
    relations: &[],
};

/// Label templates, in cascade priority order.
pub const TEMPLATES: [EmotionTemplate; 12] = [
    EmotionTemplate {
        label: "joy",
        score: 0.9,
        valence: 0.8,
        arousal: 0.7,
        colors: &["#FFD54F", "#FFB300"],
        intensity: 0.8,
        relations: &["love", "gratitude", "surprise"],
    },
    EmotionTemplate {
        label: "calm",
        score: 0.85,
        valence: 0.4,
        arousal: 0.2,
        colors: &["#81D4FA", "#4FC3F7"],
        intensity: 0.5,
        relations: &["gratitude", "love", "nostalgia"],
    },
    EmotionTemplate {
        label: "sadness",
        score: 0.85,
        valence: -0.7,
        arousal: 0.3,
        colors: &["#5C6BC0", "#3949AB"],
        intensity: 0.7,
        relations: &["nostalgia", "fear", "calm"],
    },
    EmotionTemplate {
        label: "fear",
        score: 0.85,
        valence: -0.6,
        arousal: 0.8,
        colors: &["#7E57C2", "#512DA8"],
        intensity: 0.75,
        relations: &["anger", "sadness", "surprise"],
    },
    EmotionTemplate {
        label: "anger",
        score: 0.9,
        valence: -0.7,
        arousal: 0.9,
        colors: &["#E53935", "#B71C1C"],
        intensity: 0.85,
        relations: &["fear", "disgust", "pride"],
    },
    EmotionTemplate {
        label: "nostalgia",
        score: 0.8,
        valence: -0.1,
        arousal: 0.3,
        colors: &["#A1887F", "#8D6E63"],
        intensity: 0.6,
        relations: &["sadness", "love", "calm"],
    },
    EmotionTemplate {
        label: "surprise",
        score: 0.8,
        valence: 0.3,
        arousal: 0.85,
        colors: &["#FF7043", "#F4511E"],
        intensity: 0.7,
        relations: &["joy", "fear", "curiosity"],
    },
    EmotionTemplate {
        label: "love",
        score: 0.9,
        valence: 0.85,
        arousal: 0.6,
        colors: &["#EC407A", "#D81B60"],
        intensity: 0.85,
        relations: &["joy", "gratitude", "calm"],
    },
    EmotionTemplate {
        label: "gratitude",
        score: 0.85,
        valence: 0.7,
        arousal: 0.4,
        colors: &["#66BB6A", "#43A047"],
        intensity: 0.65,
        relations: &["joy", "love", "calm"],
    },
    EmotionTemplate {
        label: "disgust",
        score: 0.8,
        valence: -0.6,
        arousal: 0.6,
        colors: &["#8BC34A", "#558B2F"],
        intensity: 0.65,
        relations: &["anger", "fear"],
    },
    EmotionTemplate {
        label: "curiosity",
        score: 0.75,
        valence: 0.4,
        arousal: 0.6,
        colors: &["#26C6DA", "#00ACC1"],
        intensity: 0.55,
        relations: &["surprise", "joy"],
    },
    EmotionTemplate {
        label: "pride",
        score: 0.8,
        valence: 0.6,
        arousal: 0.6,
        colors: &["#FFA726", "#FB8C00"],
        intensity: 0.7,
        relations: &["joy", "gratitude"],
    },
];

/// Keyword/emoji patterns, index-aligned with [`TEMPLATES`].
const PATTERNS: [&str; 12] = [
    r"feliz|felicidad|alegr|gracias|genial|happy|joy|glad|delight|yay|😀|😄|😁|😊|🎉",
    r"calma|tranquil|\bpaz\b|relaj|seren|calm|peace|relax|😌|🧘",
    r"triste|tristeza|llor|deprim|\bsad\b|sadness|crying|\bcry\b|depress|lonely|😢|😭|💔",
    r"miedo|temor|asust|ansiedad|ansios|nervios|fear|afraid|scared|anxious|anxiety|terrified|😨|😱|😰",
    r"enojo|enojad|rabia|furia|furios|\bodio\b|\bira\b|angry|anger|\bmad\b|furious|\bhate\b|rage|😠|😡|🤬",
    r"nostalgi|recuerd|extraño|añor|remember|miss you|memories|old days",
    r"sorpre|\bwow\b|increíble|asombr|surpris|amazing|unexpected|\bomg\b|😮|😲|🤯",
    r"amor|te amo|te quiero|cariño|\blove\b|adore|❤|😍|🥰|💕",
    r"agradec|thank|grateful|🙏",
    r"\basco\b|asqueros|repugn|disgust|gross|yuck|🤢|🤮",
    r"curios|me pregunto|interesante|wonder|intrigu|🤔|\?",
    r"orgull|logr|proud|accomplish|achiev|🏆|💪",
];

static CASCADE: LazyLock<Vec<(Regex, &'static EmotionTemplate)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .zip(TEMPLATES.iter())
        .map(|(pattern, template)| {
            let regex = Regex::new(&format!("(?i){pattern}")).expect("static emotion pattern");
            (regex, template)
        })
        .collect()
});

/// Look up the static template for a label.
pub fn template_for(label: &str) -> Option<&'static EmotionTemplate> {
    TEMPLATES.iter().find(|t| t.label == label)
}

/// Maps raw text to one dominant emotion.
pub trait Classifier: Send + Sync {
    /// Classify text. Never fails; unknown input yields a neutral record.
    fn classify(&self, text: &str) -> DominantEmotion;
}

/// Keyword/emoji priority cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// The template that `text` resolves to.
    pub fn resolve(&self, text: &str) -> &'static EmotionTemplate {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return &EMPTY_NEUTRAL;
        }

        match CASCADE.iter().find(|(regex, _)| regex.is_match(&text)) {
            Some((_, template)) => {
                debug!(label = template.label, "heuristic pattern matched");
                template
            }
            None => &UNMATCHED_NEUTRAL,
        }
    }
}

impl Classifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> DominantEmotion {
        self.resolve(text).to_dominant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{is_hex_color, is_valid_label};

    fn classify(text: &str) -> DominantEmotion {
        HeuristicClassifier::new().classify(text)
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let e = classify("   ");
        assert_eq!(e.label, "neutral");
        assert_eq!(e.score, Some(1.0));
        assert_eq!(e.valence, Some(0.0));
        assert_eq!(e.arousal, Some(0.2));
        assert_eq!(e.colors, vec!["#B0BEC5".to_string()]);
        assert_eq!(e.intensity, Some(0.1));
        assert!(e.relations.is_empty());
    }

    #[test]
    fn test_unmatched_input_is_distinct_neutral() {
        let e = classify("the train leaves at noon");
        assert_eq!(e.label, "neutral");
        assert_eq!(e.score, Some(0.6));
        assert_eq!(e.arousal, Some(0.3));
        assert_eq!(e.intensity, Some(0.2));
        assert!(e.relations.is_empty());
    }

    #[test]
    fn test_joy_wins_over_love() {
        let e = classify("Gracias por todo, te amo");
        assert_eq!(e.label, "joy");
        assert_eq!(e.relations, vec!["love", "gratitude", "surprise"]);
    }

    #[test]
    fn test_each_label_reachable() {
        let cases = [
            ("I am so happy today", "joy"),
            ("finally some peace and quiet", "calm"),
            ("estoy muy triste", "sadness"),
            ("I'm scared of the dark", "fear"),
            ("this makes me furious", "anger"),
            ("I remember our summers", "nostalgia"),
            ("wow, that was unexpected", "surprise"),
            ("te quiero mucho", "love"),
            ("thank you so much", "gratitude"),
            ("that smell is gross", "disgust"),
            ("what happens next?", "curiosity"),
            ("I'm proud of this", "pride"),
            ("😡", "anger"),
            ("🙏", "gratitude"),
        ];
        for (text, label) in cases {
            assert_eq!(classify(text).label, label, "text: {text}");
        }
    }

    #[test]
    fn test_outputs_within_ranges() {
        let inputs = [
            "",
            "???",
            "I LOVE this",
            "asco total 🤮",
            "nostalgia de los viejos tiempos",
            "🎉🎉🎉",
            "random words without feelings",
        ];
        for text in inputs {
            let e = classify(text);
            assert!(is_valid_label(&e.label));
            let score = e.score.unwrap();
            let valence = e.valence.unwrap();
            let arousal = e.arousal.unwrap();
            let intensity = e.intensity.unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert!((-1.0..=1.0).contains(&valence));
            assert!((0.0..=1.0).contains(&arousal));
            assert!((0.0..=1.0).contains(&intensity));
            assert!(e.colors.iter().all(|c| is_hex_color(c)));
        }
    }

    #[test]
    fn test_template_lookup() {
        assert_eq!(template_for("fear").map(|t| t.label), Some("fear"));
        assert!(template_for("neutral").is_none());
        assert!(template_for("empathy").is_none());
    }
}
