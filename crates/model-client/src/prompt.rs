//! Prompt sent to the remote model.

use affect_core::MAX_EMOTIONS;

/// System prompt describing the expected multi-emotion envelope.
pub fn system_prompt() -> String {
    format!(
        "You analyze the emotional content of short texts. \
         Reply with a single JSON object and nothing else, shaped as \
         {{\"version\": 1, \"emotions\": [{{\"label\", \"weight\", \"valence\", \"arousal\", \
         \"intensity\", \"colors\", \"relations\"}}], \"global\": {{\"valence\", \"arousal\"}}, \
         \"pairs\": [[label, label]]}}. \
         Use at most {MAX_EMOTIONS} emotions. Labels are lowercase snake_case ([a-z0-9_]). \
         weight, arousal and intensity are in [0, 1]; valence is in [-1, 1]. \
         colors are #RRGGBB hex strings. Every label used in pairs must appear in emotions."
    )
}

/// User message wrapping the text to analyze.
pub fn user_prompt(text: &str) -> String {
    format!("Text:\n\"\"\"\n{text}\n\"\"\"")
}
