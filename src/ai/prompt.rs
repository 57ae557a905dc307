//! Fixed prompt and response schema sent with every analysis request.

use serde_json::{json, Value};
use std::fmt::Write as _;

use crate::models::{ColorCategory, PARAMETER_COUNT};

/// System instruction: judge the voice, never the words.
pub fn system_instruction() -> String {
    let mut text = String::from(
        "You are an expert Voice Analyst and Color Therapist.\n\
         Your task is to analyze the audio input (tone, pitch, speed, pauses, emotion, energy) \
         and map it to a specific 12-color personality framework.\n\
         IMPORTANT: Everyone reads the exact same script. Do NOT evaluate the content of the \
         speech (words, meaning). Focus ONLY on the non-verbal qualities of the voice \
         (how they say it).\n\n\
         The 12 Colors and their definitions are:\n",
    );

    for (i, category) in ColorCategory::ALL.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} ({}): {} ({}) - {}",
            i + 1,
            category.name(),
            category.label(),
            category.sub_label(),
            category.trait_name(),
            category.keywords()
        );
    }

    text.push_str(
        "\nListen to the voice.\n\
         - Is it fast and energetic? (Red/Yellow)\n\
         - Is it deep and calm? (Navy/Violet)\n\
         - Is it warm and welcoming? (Orange/Coral/Magenta)\n\
         - Is it clear and articulate? (Blue/Gold)\n\n\
         Assign a score from 0 to 100 for EACH of the 12 categories based on the voice qualities.\n\
         Provide a general summary of the voice type.\n\
         The description for each parameter should briefly explain why the voice reflects this trait.\n",
    );

    text
}

/// User turn that accompanies the audio part.
pub fn analysis_request() -> String {
    let mut text = format!(
        "Analyze this voice. Return the result in Japanese. Ensure the output strictly follows \
         the JSON schema.\nThe parameters array MUST contain exactly {} items corresponding to \
         the {} colors listed below.\nUse these exact labels and approximate hex codes:\n",
        PARAMETER_COUNT, PARAMETER_COUNT
    );

    for category in ColorCategory::ALL {
        let _ = writeln!(
            text,
            "- {}: {} ({} - {}) id: {}",
            category.name(),
            category.color_code(),
            category.label(),
            category.sub_label(),
            category.id()
        );
    }

    text
}

/// Gemini `responseSchema` describing `AnalysisResult`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "parameters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "label": { "type": "STRING" },
                        "subLabel": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "description": { "type": "STRING" },
                        "colorCode": { "type": "STRING" }
                    },
                    "required": ["id", "label", "subLabel", "score", "description", "colorCode"]
                }
            }
        },
        "required": ["summary", "parameters"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_lists_every_color() {
        let text = system_instruction();
        for category in ColorCategory::ALL {
            assert!(text.contains(category.label()), "missing {}", category.name());
        }
        assert!(text.contains("12. Magenta"));
        assert!(text.contains("Do NOT evaluate the content"));
    }

    #[test]
    fn test_request_names_hex_codes() {
        let text = analysis_request();
        assert!(text.contains("exactly 12 items"));
        assert!(text.contains("- Navy: #1E3A8A"));
        assert!(text.contains("id: lime_green"));
    }

    #[test]
    fn test_schema_requires_camel_case_fields() {
        let schema = response_schema();
        let required = schema["properties"]["parameters"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 6);
        assert!(required.contains(&json!("subLabel")));
        assert!(required.contains(&json!("colorCode")));
    }
}
