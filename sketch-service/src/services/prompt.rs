//! Instruction prompt and response schema sent with every sketch.

use crate::config::GenerationMode;
use crate::models::ElementType;
use serde_json::{json, Value};

/// Fixed instructions describing the target JSON and how to read a sketch.
pub const SKETCH_PROMPT: &str = r#"You are an expert UI analyst. The user has uploaded a HAND-DRAWN UI SKETCH.

TASK
Convert the hand-drawn UI sketch into a structured UI description JSON.

OUTPUT RULES
- Output PURE JSON only
- No Markdown
- No explanations
- No text outside JSON
- Do not invent elements that are not clearly present in the sketch
- Prefer concise, meaningful component mapping
- STRICTLY follow the schema

SCHEMA (STRICT, do not change)
{
  "screen_name": "string",
  "layout": "single-column | two-column | three-column",
  "sections": [
    {
      "title": "string",
      "elements": [
        {
          "type": "heading | subheading | text | input | textarea | select | number | button | table | icon | image | navbar",
          "label": "string",
          "value": "string | number | null",
          "options": ["array of strings - for select"],
          "headers": ["for table"],
          "rows": [["for table"]],
          "placeholder": "optional",
          "icon": "optional",
          "src": "optional for image",
          "alt": "optional for image",
          "size": "small | medium | large",
          "position": "left | right | center",
          "brand": "for navbar",
          "items": [
            { "label": "string", "variant": "primary | secondary" }
          ],
          "col_span": 1
        }
      ]
    }
  ]
}

INTERPRETATION RULES
- large text at top -> heading
- slightly smaller emphasized text -> subheading
- boxed single-line text -> input
- boxed multi-line region -> textarea
- box with a down arrow -> select dropdown
- + / - or steppers -> number input
- row of buttons at top -> navbar
- repeated rectangle grid -> table
- image placeholder box or mountain icon -> image
- small pictograms -> icon
- grouped UI controls -> form section

LAYOUT INFERENCE
- one main vertical column -> "single-column"
- left content + right panel/form -> "two-column"
- dense grid of cards/widgets -> "three-column"

NAVBAR DETECTION
- if buttons/text are horizontally aligned at the top of the page
- treat them as ONE element:
{
  "type": "navbar",
  "brand": "text near top-left or title",
  "items": [
    { "label": "...", "variant": "primary|secondary" }
  ]
}
Do NOT emit multiple separate buttons for navbar elements.

IMAGE RULES
- rectangular placeholder with X, mountain, or picture icon -> image
- do NOT hallucinate a real image src
- use:
  "src": null
  "alt": textual description
- infer relative size (small / medium / large)
- infer position alignment (left / right / center)

TABLE RULES
If the sketch shows columns and rows, labeled headers, or aligned numeric/text grids, output:
{
 "type": "table",
 "headers": [...],
 "rows": [...]
}

SPACING AND GROUPING
- visually grouped items belong in the same section
- aligned blocks suggest columns
- margin boxes imply card or panel groups
- order sections and elements top-to-bottom, then left-to-right

FINAL CONSTRAINT
Return ONLY valid JSON.
No comments.
No prose.
No trailing commas.
"#;

const STRUCTURED_NOTE: &str =
    "\nThe response is constrained to the schema above; fill every required field.\n";

/// Prompt text for the given generation mode.
pub fn build_prompt(mode: GenerationMode) -> String {
    match mode {
        GenerationMode::Freeform => SKETCH_PROMPT.to_string(),
        GenerationMode::Structured => format!("{}{}", SKETCH_PROMPT, STRUCTURED_NOTE),
    }
}

/// Response schema for schema-constrained generation.
///
/// Uses the OpenAPI subset accepted by Gemini's `responseSchema`.
pub fn response_schema() -> Value {
    let element_types: Vec<&str> = ElementType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "screen_name": { "type": "STRING" },
            "layout": {
                "type": "STRING",
                "enum": ["single-column", "two-column", "three-column"]
            },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "elements": {
                            "type": "ARRAY",
                            "items": element_schema(&element_types)
                        }
                    },
                    "required": ["title", "elements"],
                    "propertyOrdering": ["title", "elements"]
                }
            }
        },
        "required": ["screen_name", "layout", "sections"],
        "propertyOrdering": ["screen_name", "layout", "sections"]
    })
}

fn element_schema(element_types: &[&str]) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "type": { "type": "STRING", "enum": element_types },
            "label": { "type": "STRING" },
            // Gemini's schema subset has no union types; numbers come back as text.
            "value": { "type": "STRING", "nullable": true },
            "options": { "type": "ARRAY", "items": { "type": "STRING" } },
            "headers": { "type": "ARRAY", "items": { "type": "STRING" } },
            "rows": {
                "type": "ARRAY",
                "items": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "placeholder": { "type": "STRING" },
            "icon": { "type": "STRING" },
            "src": { "type": "STRING", "nullable": true },
            "alt": { "type": "STRING" },
            "size": { "type": "STRING", "enum": ["small", "medium", "large"] },
            "position": { "type": "STRING", "enum": ["left", "right", "center"] },
            "brand": { "type": "STRING" },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "variant": { "type": "STRING", "enum": ["primary", "secondary"] }
                    },
                    "required": ["label"]
                }
            },
            "col_span": { "type": "INTEGER" }
        },
        "required": ["type", "label"],
        "propertyOrdering": [
            "type", "label", "value", "options", "headers", "rows", "placeholder",
            "icon", "src", "alt", "size", "position", "brand", "items", "col_span"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_describes_schema_and_rules() {
        let prompt = build_prompt(GenerationMode::Freeform);
        assert!(prompt.contains("\"screen_name\""));
        assert!(prompt.contains("single-column | two-column | three-column"));
        assert!(prompt.contains("NAVBAR DETECTION"));
        assert!(prompt.contains("Return ONLY valid JSON."));
    }

    #[test]
    fn structured_prompt_extends_freeform_prompt() {
        let freeform = build_prompt(GenerationMode::Freeform);
        let structured = build_prompt(GenerationMode::Structured);
        assert!(structured.starts_with(&freeform));
        assert!(structured.len() > freeform.len());
    }

    #[test]
    fn schema_lists_every_element_type() {
        let schema = response_schema();
        let kinds = &schema["properties"]["sections"]["items"]["properties"]["elements"]["items"]
            ["properties"]["type"]["enum"];
        let kinds: Vec<&str> = kinds
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(kinds.len(), 12);
        assert!(kinds.contains(&"navbar"));
        assert!(kinds.contains(&"textarea"));
    }

    #[test]
    fn schema_requires_top_level_fields() {
        let schema = response_schema();
        assert_eq!(
            schema["required"],
            json!(["screen_name", "layout", "sections"])
        );
        assert_eq!(
            schema["properties"]["layout"]["enum"],
            json!(["single-column", "two-column", "three-column"])
        );
    }
}
