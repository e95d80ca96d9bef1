//! Prompts sent to the vision model.
//!
//! Every string the model sees lives here so prompt changes are made in one
//! place and can be asserted on in unit tests without a live provider.

/// Fixed task description: the first part of every system instruction.
pub const BASE_SYSTEM_PROMPT: &str = "You are an expert teacher and exercise corrector. Your task is to:
1. Analyze the uploaded exercise image(s)
2. Extract all exercises, questions, and given data
3. Provide correct, detailed answers for each question

For each exercise, include:
- The exercise name or number
- Any given data or context
- Each question with its complete correct answer and explanation";

/// Language directive used when no output language is requested.
pub const SAME_LANGUAGE_DIRECTIVE: &str =
    "IMPORTANT: Respond in the same language as the exercise content.";

/// Text block that precedes the images in the user message.
pub const USER_INSTRUCTION: &str =
    "Please analyze and correct the exercises in the following image(s).";

/// Build the system instruction.
///
/// Parts, in order, separated by a blank line:
/// 1. [`BASE_SYSTEM_PROMPT`]
/// 2. `IMPORTANT: Respond in <language>.` or [`SAME_LANGUAGE_DIRECTIVE`]
/// 3. `User preferences: <prefs>` when preferences are given
///
/// Blank `output_language` / `user_preferences` count as absent.
pub fn build_system_prompt(output_language: Option<&str>, user_preferences: Option<&str>) -> String {
    let mut prompt = String::from(BASE_SYSTEM_PROMPT);

    prompt.push_str("\n\n");
    match output_language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => prompt.push_str(&format!("IMPORTANT: Respond in {language}.")),
        None => prompt.push_str(SAME_LANGUAGE_DIRECTIVE),
    }

    if let Some(prefs) = user_preferences.filter(|p| !p.trim().is_empty()) {
        prompt.push_str("\n\nUser preferences: ");
        prompt.push_str(prefs);
    }

    prompt
}
