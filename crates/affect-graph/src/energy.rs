//! Energy rules: fixed semantic relationships between emotions.
//!
//! Each rule owns a hardcoded label table and links emotions that are both
//! present in the current analysis. Rules never introduce new nodes. The same
//! pair may be linked by several rules or several times by one rule; callers
//! merge the output with [`crate::graph::merge_links`].

use tracing::trace;

use crate::ontology::{Emotion, Link, LinkKind};

/// Default intensity assumed for emotions without one.
const DEFAULT_INTENSITY: f32 = 0.6;

/// A rule deriving links for one emotion against the full set.
pub trait EnergyRule: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Whether this rule triggers on `emotion`.
    fn applies_to(&self, emotion: &Emotion) -> bool;

    /// Links from `emotion` to other members of `all`.
    fn linkify(&self, emotion: &Emotion, all: &[Emotion]) -> Vec<Link>;
}

/// Link weight from a base strength and the endpoints' affect.
///
/// Similarity blends valence (0.6) and arousal (0.4) closeness; the mean
/// intensity scales the result, which is kept in [0.2, 0.95].
pub fn energy_weight(base: f32, a: &Emotion, b: &Emotion) -> f32 {
    let dv = (a.valence.unwrap_or(0.0) - b.valence.unwrap_or(0.0)).abs();
    let da = (a.arousal.unwrap_or(0.5) - b.arousal.unwrap_or(0.5)).abs();
    let sim = 0.6 * (1.0 - dv.min(1.0)) + 0.4 * (1.0 - da.min(1.0));

    let intensity = ((a.intensity.unwrap_or(DEFAULT_INTENSITY)
        + b.intensity.unwrap_or(DEFAULT_INTENSITY))
        / 2.0)
        .clamp(0.4, 1.0);

    (base * (0.5 + 0.5 * sim) * intensity).clamp(0.2, 0.95)
}

/// Case-insensitive lookup among present emotions.
fn find<'a>(all: &'a [Emotion], label: &str) -> Option<&'a Emotion> {
    all.iter().find(|e| e.label.eq_ignore_ascii_case(label))
}

fn is(emotion: &Emotion, label: &str) -> bool {
    emotion.label.eq_ignore_ascii_case(label)
}

fn link(kind: LinkKind, base: f32, from: &Emotion, to: &Emotion) -> Link {
    Link::new(&from.id, &to.id, kind, energy_weight(base, from, to))
}

// ============================================================================
// Polarity
// ============================================================================

/// Expansive, contractive and bridging pairs.
pub struct PolarityRule;

const POLARITY_PAIRS: &[(&str, &str, f32)] = &[
    // expansive
    ("joy", "love", 0.8),
    ("joy", "gratitude", 0.7),
    ("love", "gratitude", 0.7),
    ("calm", "gratitude", 0.6),
    ("pride", "joy", 0.6),
    // contractive
    ("fear", "anger", 0.7),
    ("sadness", "fear", 0.6),
    ("anger", "disgust", 0.6),
    ("sadness", "nostalgia", 0.6),
    // bridges
    ("surprise", "joy", 0.5),
    ("surprise", "fear", 0.5),
    ("nostalgia", "love", 0.5),
    ("curiosity", "surprise", 0.5),
];

impl EnergyRule for PolarityRule {
    fn name(&self) -> &'static str {
        "polarity"
    }

    fn applies_to(&self, emotion: &Emotion) -> bool {
        POLARITY_PAIRS.iter().any(|(from, _, _)| is(emotion, from))
    }

    fn linkify(&self, emotion: &Emotion, all: &[Emotion]) -> Vec<Link> {
        POLARITY_PAIRS
            .iter()
            .filter(|(from, _, _)| is(emotion, from))
            .filter_map(|(_, to, base)| {
                find(all, to).map(|other| link(LinkKind::Polarity, *base, emotion, other))
            })
            .collect()
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Directional shifts between states.
pub struct TransitionRule;

const TRANSITIONS: &[(&str, &str, f32)] = &[
    ("fear", "calm", 0.6),
    ("anger", "pride", 0.5),
    ("anger", "calm", 0.45),
    ("sadness", "empathy", 0.55),
    ("sadness", "gratitude", 0.45),
    ("surprise", "joy", 0.55),
    ("surprise", "fear", 0.45),
    ("nostalgia", "gratitude", 0.5),
    ("curiosity", "joy", 0.45),
];

impl EnergyRule for TransitionRule {
    fn name(&self) -> &'static str {
        "transition"
    }

    fn applies_to(&self, emotion: &Emotion) -> bool {
        TRANSITIONS.iter().any(|(from, _, _)| is(emotion, from))
    }

    fn linkify(&self, emotion: &Emotion, all: &[Emotion]) -> Vec<Link> {
        TRANSITIONS
            .iter()
            .filter(|(from, _, _)| is(emotion, from))
            .filter_map(|(_, to, base)| {
                find(all, to).map(|other| link(LinkKind::Transition, *base, emotion, other))
            })
            .collect()
    }
}

// ============================================================================
// Cause
// ============================================================================

/// Two present emotions jointly pointing at a third present one.
pub struct CauseRule;

/// (trigger, partner, effect, base)
const CAUSES: &[(&str, &str, &str, f32)] = &[
    ("fear", "love", "guilt", 0.6),
    ("sadness", "love", "compassion", 0.65),
    ("anger", "sadness", "resentment", 0.55),
    ("joy", "pride", "gratitude", 0.5),
];

impl EnergyRule for CauseRule {
    fn name(&self) -> &'static str {
        "cause"
    }

    fn applies_to(&self, emotion: &Emotion) -> bool {
        CAUSES.iter().any(|(trigger, _, _, _)| is(emotion, trigger))
    }

    fn linkify(&self, emotion: &Emotion, all: &[Emotion]) -> Vec<Link> {
        let mut links = Vec::new();
        for (_, partner, effect, base) in CAUSES.iter().filter(|c| is(emotion, c.0)) {
            if let (Some(partner), Some(effect)) = (find(all, partner), find(all, effect)) {
                links.push(link(LinkKind::Cause, *base, emotion, effect));
                links.push(link(LinkKind::Cause, *base, partner, effect));
            }
        }
        links
    }
}

// ============================================================================
// Function
// ============================================================================

/// Pairs sharing an adaptive purpose.
pub struct FunctionRule;

/// (from, to, purpose, base)
const FUNCTIONS: &[(&str, &str, &str, f32)] = &[
    ("fear", "anger", "protects↔defends", 0.55),
    ("sadness", "calm", "heals↔soothes", 0.5),
    ("disgust", "fear", "rejects↔avoids", 0.45),
    ("curiosity", "joy", "explores↔rewards", 0.45),
    ("love", "calm", "bonds↔settles", 0.5),
];

impl EnergyRule for FunctionRule {
    fn name(&self) -> &'static str {
        "function"
    }

    fn applies_to(&self, emotion: &Emotion) -> bool {
        FUNCTIONS.iter().any(|(from, _, _, _)| is(emotion, from))
    }

    fn linkify(&self, emotion: &Emotion, all: &[Emotion]) -> Vec<Link> {
        FUNCTIONS
            .iter()
            .filter(|(from, _, _, _)| is(emotion, from))
            .filter_map(|(_, to, purpose, base)| {
                find(all, to).map(|other| {
                    trace!(from = %emotion.label, to = %other.label, purpose, "function link");
                    link(LinkKind::Function, *base, emotion, other)
                })
            })
            .collect()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Ordered set of energy rules.
pub struct EnergyEngine {
    rules: Vec<Box<dyn EnergyRule>>,
}

impl EnergyEngine {
    /// Polarity, transition, cause, function, in that order.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(PolarityRule),
                Box::new(TransitionRule),
                Box::new(CauseRule),
                Box::new(FunctionRule),
            ],
        }
    }

    /// Engine with a custom rule list.
    pub fn with_rules(rules: Vec<Box<dyn EnergyRule>>) -> Self {
        Self { rules }
    }

    /// Run every rule against every emotion. Output may contain duplicates.
    pub fn apply(&self, emotions: &[Emotion]) -> Vec<Link> {
        let mut links = Vec::new();
        for rule in &self.rules {
            for emotion in emotions.iter().filter(|e| rule.applies_to(e)) {
                let produced = rule.linkify(emotion, emotions);
                if !produced.is_empty() {
                    trace!(rule = rule.name(), from = %emotion.label, count = produced.len());
                }
                links.extend(produced);
            }
        }
        links
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for EnergyEngine {
    fn default() -> Self {
        Self::new()
    }
}
