//! LLM prompt engineering for set extraction

use liftlog_domain::CompletionRequest;

/// Sampling temperature for every extraction call
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// Builds the two-message exchange sent to the model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl PromptBuilder {
    /// Create a builder around a system prompt
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// The system prompt in use
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Build the request; the user message is exactly `text`
    pub fn build(&self, text: &str) -> CompletionRequest {
        CompletionRequest::new(self.system_prompt.as_str(), text)
            .with_temperature(EXTRACTION_TEMPERATURE)
            .with_json_output(true)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Built-in extraction prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You convert informal workout notes into structured set records.

The input is a messy block of text. A line usually describes one set and may contain:
- an exercise name, often misspelled or abbreviated
- a weight and a rep count, e.g. "50x8"
- assisted reps in parentheses after the total, e.g. "8(2)"
- a date
- tempo notation, e.g. "3-1-1"
- remarks about pain or injury
- equipment codes: DB = dumbbell, BB = barbell, BW = bodyweight, Machine, Cable

Respond with one JSON object that has a single key "sets". Its value is an array
with one object per set, shaped like this:

{
  "sets": [
    {
      "date": "YYYY-MM-DD, or empty string when the notes give no date",
      "exercise_name": "corrected exercise name including equipment, e.g. DB Bench Press",
      "weight": number,
      "reps_unassisted": integer,
      "reps_assisted": integer,
      "reps_total": integer,
      "tempo_notes": "tempo exactly as written, or empty string",
      "injury_flag": boolean,
      "injury_notes": "what was reported when injury_flag is true, otherwise empty string",
      "equipment": "DB, BB, BW, Machine, Cable, ...",
      "source_line": "the raw text this set came from",
      "notes": "anything else"
    }
  ]
}

Rules:
- Fix typos and standardize exercise names. Always put the equipment in the name.
- For dumbbell (DB) work the weight is per hand, unless the text says "single arm" or similar.
- "N(M)" means N total reps of which M were assisted: reps_total = N, reps_assisted = M,
  reps_unassisted = N - M.
- Without parentheses, reps_assisted = 0 and reps_unassisted = reps_total.
- Words such as hurt, pain, tweak, twinge, strain or "back issue" mean injury_flag = true;
  describe the problem in injury_notes. Otherwise injury_flag = false and injury_notes is empty.
- Copy tempo notation like "3-1-1" verbatim into tempo_notes.
- Never guess a date. Leave date empty when none is written.

Return only the JSON object. No markdown, no commentary, no trailing text."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uses_text_as_user_message() {
        let request = PromptBuilder::default().build("DB Bench 50x8(2)");
        assert_eq!(request.user, "DB Bench 50x8(2)");
        assert_eq!(request.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_build_is_deterministic_json() {
        let request = PromptBuilder::default().build("Squat 225x5");
        assert_eq!(request.temperature, 0.0);
        assert!(request.json_output);
    }

    #[test]
    fn test_custom_prompt_keeps_zero_temperature() {
        let builder = PromptBuilder::new("custom");
        let request = builder.build("x");
        assert_eq!(builder.system_prompt(), "custom");
        assert_eq!(request.system, "custom");
        assert_eq!(request.temperature, EXTRACTION_TEMPERATURE);
    }

    #[test]
    fn test_default_prompt_covers_contract() {
        let prompt = DEFAULT_SYSTEM_PROMPT;
        assert!(prompt.contains(r#""sets""#));
        assert!(prompt.contains("per hand"));
        assert!(prompt.contains("reps_unassisted = N - M"));
        assert!(prompt.contains("injury_flag = true"));
        assert!(prompt.contains("3-1-1"));
        assert!(prompt.contains("Never guess a date"));
        assert!(prompt.contains("Return only the JSON object"));
    }
}
