//! Fixed instruction prompt and structured-output schema.

use serde_json::{json, Value};

/// Separator placed between calendar events in the prompt body.
pub const EVENT_SEPARATOR: &str = "\n---\n";

const INSTRUCTIONS: &str = r#"אתה מתאם טיפול משפחתי חכם בשם "דואגים ללולי". נתח את אירועי היומן הבאים עבור אמא (דיילת אוויר).

1. זהה אירועי עבודה (טיסות, כוננות, משמרת) והתעלם מאירועים אישיים.
2. עבור כל טיסה:
   - חלץ מספר טיסה, מוצא ויעד.
   - חלץ תאריך בפורמט DD/MM/YYYY והכנס אותו ל-dateLabel.
   - חשב "חלון טיפול": שעה לפני ההמראה ועד שעה אחרי הנחיתה.
   - צור 3 משימות טיפול בילדה "עלמא" בעברית:
     * "איסוף של עלמא מהמסגרת" (לפי שעת היציאה).
     * "ארוחת ערב לעלמא" (סביב 18:30 אם בטווח הטיסה).
     * "מקלחת והשכבה של עלמא" (סביב 20:00 אם בטווח הטיסה).
   - סוג המשימה (type) חייב להיות אחד מ: איסוף, ארוחה, מקלחת והשכבה, לינה, עזרה כללית.
   - כל השעות בפורמט HH:MM.

החזר רשימת JSON בעברית בלבד. ודא שכל משימה כוללת dateLabel (למשל: "יום חמישי 25/10").

אירועים לניתוח:
"#;

/// Builds the full prompt for one batch of calendar events.
pub fn build_prompt<E: AsRef<str>>(events: &[E]) -> String {
    let body = events
        .iter()
        .map(|event| event.as_ref())
        .collect::<Vec<&str>>()
        .join(EVENT_SEPARATOR);
    format!("{INSTRUCTIONS}{body}\n")
}

/// Structured-output schema sent with every extraction request.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "flightNumber": { "type": "STRING" },
                "origin": { "type": "STRING" },
                "destination": { "type": "STRING" },
                "departureTime": { "type": "STRING" },
                "arrivalTime": { "type": "STRING" },
                "dateLabel": { "type": "STRING" },
                "careStart": { "type": "STRING" },
                "careEnd": { "type": "STRING" },
                "suggestedTasks": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "type": { "type": "STRING" },
                            "description": { "type": "STRING" },
                            "time": { "type": "STRING" },
                            "dateLabel": { "type": "STRING" }
                        },
                        "required": ["type", "description", "time", "dateLabel"]
                    }
                }
            },
            "required": [
                "flightNumber", "origin", "destination", "departureTime",
                "arrivalTime", "dateLabel", "careStart", "careEnd", "suggestedTasks"
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, response_schema, EVENT_SEPARATOR};

    #[test]
    fn prompt_joins_events_with_separator() {
        let prompt = build_prompt(&["LY315 14:00", "AF123 22:00"]);
        assert!(prompt.contains(&format!("LY315 14:00{EVENT_SEPARATOR}AF123 22:00")));
        assert!(prompt.starts_with("אתה מתאם טיפול"));
    }

    #[test]
    fn schema_requires_every_shift_field() {
        let schema = response_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 9);
        assert_eq!(schema["type"], "ARRAY");
    }
}
