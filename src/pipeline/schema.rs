//! Structured-output declaration sent as `response_format`.
//!
//! The schema is strict: every property is required and
//! `additionalProperties` is `false` at every object level. The provider is
//! asked to honour it, and [`crate::pipeline::parse`] enforces the same shape
//! again on receipt through the `deny_unknown_fields` model types.

use serde_json::{json, Value};

/// Name the schema is registered under in the request.
pub const SCHEMA_NAME: &str = "exercise_correction";

/// JSON schema of [`crate::CorrectionResult`].
pub fn correction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "exercises": {
                "type": "array",
                "description": "List of exercises with their corrections",
                "items": {
                    "type": "object",
                    "properties": {
                        "exercise_name": {
                            "type": "string",
                            "description": "Name or number of the exercise"
                        },
                        "given_data": {
                            "type": "string",
                            "description": "Data provided in the exercise"
                        },
                        "questions": {
                            "type": "array",
                            "description": "List of questions and their answers",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "question": {
                                        "type": "string",
                                        "description": "The original question text"
                                    },
                                    "answer": {
                                        "type": "string",
                                        "description": "The correct answer with explanation"
                                    }
                                },
                                "required": ["question", "answer"],
                                "additionalProperties": false
                            }
                        }
                    },
                    "required": ["exercise_name", "given_data", "questions"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["exercises"],
        "additionalProperties": false
    })
}

/// The complete `response_format` value.
pub fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": SCHEMA_NAME,
            "strict": true,
            "schema": correction_schema()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_levels(schema: &Value) -> Vec<&Value> {
        let exercise = &schema["properties"]["exercises"]["items"];
        let question = &exercise["properties"]["questions"]["items"];
        vec![schema, exercise, question]
    }

    #[test]
    fn every_object_level_is_closed() {
        let schema = correction_schema();
        for level in object_levels(&schema) {
            assert_eq!(level["type"], "object");
            assert_eq!(level["additionalProperties"], false);
        }
    }

    #[test]
    fn every_property_is_required() {
        let schema = correction_schema();
        for level in object_levels(&schema) {
            let props: Vec<&String> = level["properties"].as_object().unwrap().keys().collect();
            let required = level["required"].as_array().unwrap();
            assert_eq!(props.len(), required.len());
            for p in props {
                assert!(required.contains(&Value::String(p.clone())), "{p} not required");
            }
        }
    }

    #[test]
    fn question_and_answer_are_mandatory() {
        let schema = correction_schema();
        let question = object_levels(&schema)[2];
        assert_eq!(question["required"], json!(["question", "answer"]));
    }

    #[test]
    fn response_format_is_strict_json_schema() {
        let rf = response_format();
        assert_eq!(rf["type"], "json_schema");
        assert_eq!(rf["json_schema"]["name"], SCHEMA_NAME);
        assert_eq!(rf["json_schema"]["strict"], true);
        assert_eq!(rf["json_schema"]["schema"], correction_schema());
    }
}
