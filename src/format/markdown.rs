//! Markdown rendering of a [`CorrectionResult`].

use crate::output::CorrectionResult;

/// Render the result as Markdown.
///
/// Per exercise, in array order:
///
/// ```text
/// ## <exercise_name>
///
/// *<given_data>*            (omitted for blank / sentinel given data)
///
/// **1. <question>**
///
/// <answer>
///
///
/// ---
/// ```
///
/// Question numbers restart at 1 for every exercise. Pure and total: the same
/// value always renders to the same string, and an empty result renders to
/// the empty string.
pub fn format_as_markdown(result: &CorrectionResult) -> String {
    let mut lines: Vec<String> = Vec::new();

    for exercise in &result.exercises {
        lines.push(format!("## {}", exercise.exercise_name));
        lines.push(String::new());

        if let Some(given) = exercise.visible_given_data() {
            lines.push(format!("*{given}*"));
            lines.push(String::new());
        }

        for (i, q) in exercise.questions.iter().enumerate() {
            lines.push(format!("**{}. {}**", i + 1, q.question));
            lines.push(String::new());
            lines.push(q.answer.clone());
            lines.push(String::new());
            lines.push(String::new());
        }

        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}
