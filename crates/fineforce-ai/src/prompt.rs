//! Prompt templates and the structured-output schema.

use fineforce_core::ViolationType;
use serde_json::{Value, json};

pub const ANALYSIS_PROMPT: &str = "\
Analyze this traffic violation image from India very quickly (respond within 5-6 seconds).

1.  **Violation Identification:** Identify the single most obvious violation from this list: \
'Speeding', 'Red Light', 'No Parking', 'Wrong Lane', 'Illegal U-Turn', 'No Helmet (Driver)', \
'No Helmet (Pillion)', 'Triple Riding'. Prioritize common violations. If no violation is clear, \
set \"violationType\" to \"Unclear\".
2.  **Vehicle Number:** Generate a plausible, random Indian vehicle license plate number (e.g., MH 12 AB 1234).
3.  **Description:** Provide a simple, one-sentence description for the detected violation. \
For example: \"A motorcycle is seen driving without a helmet.\"
4.  **Location:** If the location is not immediately obvious from landmarks, just respond with \"Not Detected\".
5.  **Confidence Score:** Provide a confidence score from 0 to 100 on your violation assessment.
6.  **Contributing Factors:** List one or two potential contributing factors (e.g., 'Heavy Traffic').

Return the analysis in JSON format.";

pub const DASHBOARD_INSTRUCTION: &str = "\
You are FineForce AI, a sophisticated and helpful assistant for traffic law enforcement personnel. \
Your purpose is to analyze traffic data and provide clear, concise, and actionable insights. \
When a user asks a question, assume you have access to a real-time traffic violations database. \
Respond in a professional, data-centric manner. Use formatting like bullet points to make \
information easy to digest. Do not answer questions unrelated to traffic management, road safety, \
or law enforcement.";

pub const COMMAND_CENTER_INSTRUCTION: &str = "\
You are the FineForce AI Command Center, a powerful, analytical AI for senior traffic enforcement \
officers and analysts. Your role is to provide deep, strategic insights based on a comprehensive \
(simulated) real-time traffic violations database.
- **Analyze Deeply:** Go beyond simple data retrieval. Identify trends, correlations, and anomalies.
- **Predict & Forecast:** Use historical data patterns to forecast future hotspots, peak violation \
times, and potential revenue.
- **Strategize & Recommend:** Propose data-driven enforcement strategies, optimal officer \
deployment, and resource allocation.
- **Be Proactive:** Anticipate user needs. If they ask for data, also provide the \"so what?\", \
the insight or action that data suggests.
- **Format for Clarity:** Use Markdown, including tables, lists, and bold text, to structure \
complex information effectively.
Your tone is professional, authoritative, and data-driven. Do not answer questions outside the \
scope of traffic management, urban planning, and public safety.";

pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "Identify the top 3 violation hotspots from last month.",
    "Forecast revenue from speeding fines for the next quarter.",
    "What's the correlation between time of day and red light violations?",
    "Suggest an optimal patrol route for Zone B to reduce illegal parking.",
];

/// Response schema matching [`fineforce_core::AnalysisResult`].
pub fn analysis_schema() -> Value {
    let mut types: Vec<&str> = ViolationType::ALL.iter().map(|t| t.label()).collect();
    types.push("Unclear");
    json!({
        "type": "OBJECT",
        "properties": {
            "vehicleNumber": {
                "type": "STRING",
                "description": "A plausible, randomly generated Indian vehicle number."
            },
            "violationType": {
                "type": "STRING",
                "description": "The type of traffic violation detected. If none, state 'Unclear'.",
                "enum": types
            },
            "fine": {
                "type": "INTEGER",
                "description": "The suggested fine amount in INR. Should be 0 if the violation is 'Unclear'."
            },
            "location": {
                "type": "STRING",
                "description": "A short description of the location, or 'Not Detected'."
            },
            "description": {
                "type": "STRING",
                "description": "A simple, one-sentence description of the violation observed."
            },
            "confidenceScore": {
                "type": "INTEGER",
                "description": "A confidence score (0-100) for the detected violation."
            },
            "contributingFactors": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A list of factors that may have contributed to the violation."
            }
        },
        "required": [
            "vehicleNumber", "violationType", "fine", "location",
            "description", "confidenceScore", "contributingFactors"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_enumerates_every_type_plus_unclear() {
        let schema = analysis_schema();
        let values = schema["properties"]["violationType"]["enum"].as_array().unwrap();
        assert_eq!(values.len(), ViolationType::ALL.len() + 1);
        assert_eq!(values.last().unwrap(), "Unclear");
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
    }
}
