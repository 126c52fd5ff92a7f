//! Untrusted model response parsing.
//!
//! Two tiers: a strict multi-emotion envelope with full range and
//! referential checks, then a permissive single-emotion record that tolerates
//! missing fields. When both fail the caller is expected to fall back to the
//! local heuristic chain.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::record::{
    clamp_signed, clamp_unit, finite, is_hex_color, is_valid_label, normalize_label,
    sanitize_colors, DominantEmotion, EmotionRecord, GlobalAffect, MultiEmotion, MAX_EMOTIONS,
};

/// Why a response could not be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("No JSON object found in response")]
    NoJsonObject,

    #[error("Malformed JSON: {0}")]
    Json(String),

    #[error("Unsupported payload version: {0}")]
    UnsupportedVersion(u32),

    #[error("Too many emotions: {0} (max 8)")]
    TooManyEmotions(usize),

    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    #[error("Field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("Pair references unknown label: {0:?}")]
    DanglingPair(String),

    #[error("Strict parse failed ({strict}); permissive parse failed ({permissive})")]
    Unusable {
        strict: Box<PayloadError>,
        permissive: Box<PayloadError>,
    },
}

pub type Result<T> = std::result::Result<T, PayloadError>;

/// A response that survived one of the two tiers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    /// Fully validated multi-emotion envelope.
    Strict(MultiEmotion),
    /// Best-effort single emotion; needs expansion.
    Permissive(DominantEmotion),
}

/// Parse a raw model response, strict tier first.
pub fn parse_response(text: &str) -> Result<ParsedPayload> {
    let block = extract_json_block(text).ok_or(PayloadError::NoJsonObject)?;

    let strict = match parse_strict(block) {
        Ok(multi) => return Ok(ParsedPayload::Strict(multi)),
        Err(e) => e,
    };
    tracing::debug!(error = %strict, "strict payload rejected, trying permissive parse");

    match parse_permissive(block) {
        Ok(dominant) => Ok(ParsedPayload::Permissive(dominant)),
        Err(permissive) => Err(PayloadError::Unusable {
            strict: Box::new(strict),
            permissive: Box::new(permissive),
        }),
    }
}

/// First balanced `{...}` block in `text`, skipping braces inside strings.
///
/// An opening brace that never closes is skipped and the scan resumes at the
/// next one, so stray braces in surrounding prose do not hide the payload.
pub fn extract_json_block(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(start, _)| balanced_len(&text[start..]).map(|len| &text[start..start + len]))
}

/// Byte length of the balanced block opening at the start of `text`.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Strict tier
// ============================================================================

#[derive(Debug, Deserialize)]
struct StrictEnvelope {
    version: u32,
    emotions: Vec<StrictEmotion>,
    global: GlobalAffect,
    pairs: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct StrictEmotion {
    label: String,
    weight: f32,
    valence: f32,
    arousal: f32,
    #[serde(default)]
    intensity: Option<f32>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    relations: Vec<String>,
}

/// Validate a multi-emotion envelope. Any violation rejects the whole payload.
pub fn parse_strict(block: &str) -> Result<MultiEmotion> {
    let envelope: StrictEnvelope =
        serde_json::from_str(block).map_err(|e| PayloadError::Json(e.to_string()))?;

    if envelope.version != 1 {
        return Err(PayloadError::UnsupportedVersion(envelope.version));
    }
    if envelope.emotions.len() > MAX_EMOTIONS {
        return Err(PayloadError::TooManyEmotions(envelope.emotions.len()));
    }

    check_range("global.valence", envelope.global.valence, -1.0, 1.0)?;
    check_range("global.arousal", envelope.global.arousal, 0.0, 1.0)?;

    let mut emotions = Vec::with_capacity(envelope.emotions.len());
    for e in envelope.emotions {
        if !is_valid_label(&e.label) {
            return Err(PayloadError::InvalidLabel(e.label));
        }
        check_range("weight", e.weight, 0.0, 1.0)?;
        check_range("valence", e.valence, -1.0, 1.0)?;
        check_range("arousal", e.arousal, 0.0, 1.0)?;
        if let Some(intensity) = e.intensity {
            check_range("intensity", intensity, 0.0, 1.0)?;
        }
        if let Some(bad) = e.colors.iter().find(|c| !is_hex_color(c)) {
            return Err(PayloadError::InvalidColor(bad.clone()));
        }
        emotions.push(EmotionRecord {
            label: e.label,
            weight: e.weight,
            valence: Some(e.valence),
            arousal: Some(e.arousal),
            colors: e.colors,
            intensity: e.intensity,
            relations: e.relations,
        });
    }

    let labels: HashSet<&str> = emotions.iter().map(|e| e.label.as_str()).collect();
    for (a, b) in &envelope.pairs {
        for label in [a, b] {
            if !labels.contains(label.as_str()) {
                return Err(PayloadError::DanglingPair(label.clone()));
            }
        }
    }

    emotions.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    Ok(MultiEmotion {
        version: 1,
        emotions,
        global: envelope.global,
        pairs: envelope.pairs,
    })
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PayloadError::OutOfRange { field, value })
    }
}

// ============================================================================
// Permissive tier
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseRelations {
    Labels(Vec<String>),
    Weighted(serde_json::Map<String, serde_json::Value>),
}

impl LooseRelations {
    /// Ordered label list; weighted maps are sorted by weight descending.
    fn into_labels(self) -> Vec<String> {
        match self {
            Self::Labels(labels) => labels,
            Self::Weighted(map) => {
                let mut weighted: Vec<(String, f64)> = map
                    .into_iter()
                    .map(|(label, w)| (label, w.as_f64().unwrap_or(0.0)))
                    .collect();
                weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
                weighted.into_iter().map(|(label, _)| label).collect()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LooseEmotion {
    label: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    valence: Option<f32>,
    #[serde(default)]
    arousal: Option<f32>,
    #[serde(default)]
    colors: Option<Vec<String>>,
    #[serde(default)]
    intensity: Option<f32>,
    #[serde(default)]
    relations: Option<LooseRelations>,
}

/// Best-effort single-emotion parse.
///
/// Missing numbers default to score 1, valence 0, arousal 0.5, intensity 0;
/// present ones are clamped.
pub fn parse_permissive(block: &str) -> Result<DominantEmotion> {
    let loose: LooseEmotion =
        serde_json::from_str(block).map_err(|e| PayloadError::Json(e.to_string()))?;

    let label = normalize_label(&loose.label);
    if label.is_empty() {
        return Err(PayloadError::InvalidLabel(loose.label));
    }

    let relations = loose
        .relations
        .map(LooseRelations::into_labels)
        .unwrap_or_default()
        .iter()
        .map(|r| normalize_label(r))
        .filter(|r| !r.is_empty())
        .collect();

    Ok(DominantEmotion {
        label,
        score: Some(clamp_unit(finite(loose.score).unwrap_or(1.0))),
        valence: Some(clamp_signed(finite(loose.valence).unwrap_or(0.0))),
        arousal: Some(clamp_unit(finite(loose.arousal).unwrap_or(0.5))),
        colors: sanitize_colors(&loose.colors.unwrap_or_default()),
        intensity: Some(clamp_unit(finite(loose.intensity).unwrap_or(0.0))),
        relations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r##"{
        "version": 1,
        "emotions": [
            {"label": "love", "weight": 0.4, "valence": 0.8, "arousal": 0.5},
            {"label": "joy", "weight": 0.9, "valence": 0.8, "arousal": 0.7,
             "intensity": 0.8, "colors": ["#FFD54F"]}
        ],
        "global": {"valence": 0.7, "arousal": 0.6},
        "pairs": [["joy", "love"]]
    }"##;

    #[test]
    fn test_extract_block_from_prose() {
        let text = r#"Sure! Here it is: {"label": "joy", "note": "a } inside"} trailing {"x":1}"#;
        assert_eq!(
            extract_json_block(text),
            Some(r#"{"label": "joy", "note": "a } inside"}"#)
        );
        assert_eq!(extract_json_block("no braces here"), None);
        assert_eq!(extract_json_block("{ unbalanced"), None);
    }

    #[test]
    fn test_extract_block_skips_unclosed_braces() {
        let text = r#"Mood :-{ here is the result {"label": "joy", "score": 0.9}"#;
        assert_eq!(
            extract_json_block(text),
            Some(r#"{"label": "joy", "score": 0.9}"#)
        );
        let ParsedPayload::Permissive(dominant) = parse_response(text).unwrap() else {
            panic!("expected permissive payload");
        };
        assert_eq!(dominant.label, "joy");

        let quoted = r#"The user typed "{" twice. {"label": "fear"}"#;
        let ParsedPayload::Permissive(dominant) = parse_response(quoted).unwrap() else {
            panic!("expected permissive payload");
        };
        assert_eq!(dominant.label, "fear");
    }

    #[test]
    fn test_extract_block_honors_escaped_quotes() {
        let text = r#"result: {"label": "calm", "note": "a \" } b"} done"#;
        assert_eq!(
            extract_json_block(text),
            Some(r#"{"label": "calm", "note": "a \" } b"}"#)
        );
    }

    #[test]
    fn test_strict_accepts_and_orders() {
        let parsed = parse_response(&format!("```json\n{VALID}\n```")).unwrap();
        let ParsedPayload::Strict(multi) = parsed else {
            panic!("expected strict payload");
        };
        let labels: Vec<&str> = multi.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["joy", "love"]);
        assert_eq!(multi.pairs, vec![("joy".to_string(), "love".to_string())]);
    }

    #[test]
    fn test_strict_rejects_dangling_pair() {
        let block = VALID.replace(r#"[["joy", "love"]]"#, r#"[["joy", "awe"]]"#);
        assert_eq!(
            parse_strict(&block),
            Err(PayloadError::DanglingPair("awe".into()))
        );
        // The envelope has no top-level label, so the permissive tier fails too.
        assert!(matches!(
            parse_response(&block),
            Err(PayloadError::Unusable { .. })
        ));
    }

    #[test]
    fn test_strict_rejects_bad_fields() {
        let bad_label = VALID.replace(r#""label": "love""#, r#""label": "Love!""#);
        assert!(matches!(
            parse_strict(&bad_label),
            Err(PayloadError::InvalidLabel(_))
        ));

        let bad_weight = VALID.replace(r#""weight": 0.4"#, r#""weight": 1.4"#);
        assert!(matches!(
            parse_strict(&bad_weight),
            Err(PayloadError::OutOfRange { field: "weight", .. })
        ));

        let bad_color = VALID.replace("#FFD54F", "yellow");
        assert!(matches!(
            parse_strict(&bad_color),
            Err(PayloadError::InvalidColor(_))
        ));

        let bad_version = VALID.replace(r#""version": 1"#, r#""version": 2"#);
        assert_eq!(
            parse_strict(&bad_version),
            Err(PayloadError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn test_strict_rejects_oversized() {
        let emotions: Vec<String> = (0..9)
            .map(|i| format!(r#"{{"label":"e{i}","weight":0.5,"valence":0,"arousal":0.5}}"#))
            .collect();
        let block = format!(
            r#"{{"version":1,"emotions":[{}],"global":{{"valence":0,"arousal":0.5}},"pairs":[]}}"#,
            emotions.join(",")
        );
        assert_eq!(parse_strict(&block), Err(PayloadError::TooManyEmotions(9)));
    }

    #[test]
    fn test_permissive_defaults() {
        let parsed = parse_response(r#"The user feels {"label": "Quiet Joy"}."#).unwrap();
        let ParsedPayload::Permissive(dominant) = parsed else {
            panic!("expected permissive payload");
        };
        assert_eq!(dominant.label, "quiet_joy");
        assert_eq!(dominant.score, Some(1.0));
        assert_eq!(dominant.valence, Some(0.0));
        assert_eq!(dominant.arousal, Some(0.5));
        assert_eq!(dominant.intensity, Some(0.0));
        assert!(dominant.relations.is_empty());
    }

    #[test]
    fn test_permissive_weighted_relations() {
        let block = r##"{"label": "fear", "valence": -3, "colors": ["#7E57C2", "purple"],
            "relations": {"anger": 0.2, "sadness": 0.9, "surprise": 0.5}}"##;
        let dominant = parse_permissive(block).unwrap();
        assert_eq!(dominant.relations, vec!["sadness", "surprise", "anger"]);
        assert_eq!(dominant.valence, Some(-1.0));
        assert_eq!(dominant.colors, vec!["#7E57C2".to_string()]);
    }

    #[test]
    fn test_permissive_list_relations() {
        let block = r#"{"label": "joy", "score": 0.7, "relations": ["Love", "gratitude"]}"#;
        let dominant = parse_permissive(block).unwrap();
        assert_eq!(dominant.relations, vec!["love", "gratitude"]);
        assert_eq!(dominant.score, Some(0.7));
    }

    #[test]
    fn test_garbage_is_unusable() {
        assert_eq!(parse_response("I cannot help"), Err(PayloadError::NoJsonObject));
        assert!(matches!(
            parse_response("{not json}"),
            Err(PayloadError::Unusable { .. })
        ));
    }
}
