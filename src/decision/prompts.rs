//! Prompt templates for the decision and timetable requests.

use tracing::debug;

use crate::error::DecisionError;
use crate::preferences::{PersonalityMode, PreferenceStore};

use super::model::{DecisionMode, RequestContext};

/// Tone paragraph for each personality.
fn tone_instructions(mode: PersonalityMode) -> &'static str {
    match mode {
        PersonalityMode::Strict => "\
Personality: Strict mode. Be terse and directive. No excuses, no hedging. \
Prioritize productivity and tell the user exactly what to do.",
        PersonalityMode::Zen => "\
Personality: Zen mode. Be gentle and calm. Prioritize mental health, rest and \
wellbeing, and steer the user away from burnout.",
        PersonalityMode::Balanced => "\
Personality: Balanced mode. Use a neutral, friendly tone and find a healthy \
middle ground between productivity and rest.",
    }
}

/// Render the prompt for `ctx`. Pure: the caller supplies the stored preferences.
pub fn render_prompt(
    ctx: &RequestContext,
    personality: PersonalityMode,
    custom_instructions: &str,
) -> Result<String, DecisionError> {
    if !ctx.has_input() {
        return Err(DecisionError::InputRequired);
    }

    let activities = if ctx.activities.is_empty() {
        "none selected (use the uploaded document instead)".to_string()
    } else {
        ctx.activities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let file_line = ctx
        .file
        .as_ref()
        .map(|f| format!("\nThe user also has a schedule/doc named: \"{}\".", f.name))
        .unwrap_or_default();

    let custom = custom_instructions.trim();
    let custom_block = if custom.is_empty() {
        String::new()
    } else {
        format!("\n\nUser's personal rules (always respect these):\n{custom}")
    };

    let context = format!(
        "Act as \"DeciMate\", an advanced decision-making AI.\n\n\
         User Profile: {role}\n\
         Context: The user has selected these potential activities: {activities}.{file_line}\n\
         Current Constraints: The time of day is {bucket}.\n\n\
         {tone}{custom_block}",
        role = ctx.role,
        bucket = ctx.time_bucket,
        tone = tone_instructions(personality),
    );

    let task = match ctx.mode {
        DecisionMode::Decision => "\
Your Task:
Based on human nature (circadian rhythms, energy levels), the user's role, and the \
time of day, pick the SINGLE best activity to do right now.

Format the response as this JSON object (no markdown):
{
  \"decision\": \"Short Action Title\",
  \"reason\": \"Scientific or logical reason why this fits the current time and mood.\",
  \"icon\": \"A relevant ionicon name\"
}",
        DecisionMode::Timetable => "\
Your Task:
Build a timetable for the next few hours using the activities above. Split the time \
into focused blocks with short breaks between them, ordered by time.

Format the response as this JSON object (no markdown):
{
  \"decision\": \"Short title for the plan\",
  \"reason\": \"One line per block, e.g. 18:00 - 18:50: Study\\n18:50 - 19:00: Break\",
  \"icon\": \"A relevant ionicon name\"
}
Separate the blocks in \"reason\" with \\n line breaks.",
    };

    Ok(format!(
        "{context}\n\n{task}\n\nRespond with ONLY the JSON object. No other text."
    ))
}

/// Builds prompts from the current request plus stored personality settings.
///
/// Reads `ai_personality` and `custom_instructions`.
#[derive(Clone)]
pub struct DecisionRequestBuilder {
    prefs: PreferenceStore,
}

impl DecisionRequestBuilder {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self { prefs }
    }

    /// Assemble the prompt, or `InputRequired` when nothing was selected.
    pub async fn build(&self, ctx: &RequestContext) -> Result<String, DecisionError> {
        if !ctx.has_input() {
            return Err(DecisionError::InputRequired);
        }
        let personality = self.prefs.personality().await;
        let instructions = self.prefs.custom_instructions().await;
        debug!(
            personality = %personality,
            mode = ?ctx.mode,
            activities = ctx.activities.len(),
            has_file = ctx.file.is_some(),
            "Building decision prompt"
        );
        render_prompt(ctx, personality, &instructions)
    }
}
