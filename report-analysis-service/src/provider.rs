use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::error::{AnalysisError, Result};
use crate::extract::ReportContent;

pub const TEMPERATURE: f64 = 0.3;
pub const RESPONSE_MIME_TYPE: &str = "application/json";

pub const IMAGE_INSTRUCTION: &str = "Please analyze this medical report image and provide a structured analysis following the JSON format specified.";

pub const TEXT_INSTRUCTION: &str = "Please analyze this medical report text and provide a structured analysis following the JSON format specified:";

pub const SYSTEM_INSTRUCTION: &str = r#"You are a healthcare data analysis assistant designed strictly for educational and informational purposes, not for diagnosis or treatment. Your task is to analyze uploaded medical reports and generate a clear, structured, human-readable summary for a non-medical user.

Your responsibilities:
1. Extract key fields: patient metrics, test names, values, reference ranges, and flags
2. Classify results into Normal, Borderline, and High-Risk categories
3. Explain each abnormal value in very simple language (assume the user is a beginner)
4. Include possible lifestyle or dietary factors that commonly influence such results
5. Provide general wellness recommendations (hydration, exercise, diet, sleep, follow-ups) without prescribing medication
6. Clearly highlight urgent red-flag indicators that require consulting a certified doctor
7. Add a 'Questions to Ask Your Doctor' section
8. Include a final safety disclaimer

Output must be structured strictly in JSON with these sections:
- summary: Brief overview of the report
- key_findings: Array of {test_name, value, reference_range, status}
- abnormal_values: Array of {test_name, value, reference_range, explanation, possible_factors}
- risk_level: "Low", "Moderate", "High", or "Urgent"
- lifestyle_guidance: {hydration, exercise, diet, sleep, follow_ups}
- doctor_questions: Array of suggested questions
- disclaimer: Safety disclaimer text

Maintain a calm, supportive, non-alarming tone. Never give diagnoses, never suggest drugs, and never claim medical authority. If data is missing or unclear, explicitly state assumptions."#;

/// One completion call: fixed instruction, a single user turn, JSON output.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub content: ReportContent,
    pub temperature: f64,
    pub response_mime_type: String,
}

impl GenerationRequest {
    pub fn for_report(content: ReportContent) -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            content,
            temperature: TEMPERATURE,
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        }
    }

    /// Text parts of the user turn, in submission order.
    pub fn user_text(&self) -> String {
        match &self.content {
            ReportContent::Text(text) => format!("{}\n\n{}", TEXT_INSTRUCTION, text),
            ReportContent::Image { .. } => IMAGE_INSTRUCTION.to_string(),
        }
    }
}

/// A generative completion backend. `Ok(None)` means the provider answered
/// but produced no text.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>>;
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>> {
        match &config.gemini_api_key {
            Some(key) => Ok(Some(Self::new(key.clone(), config)?)),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>> {
        let payload = build_payload(request);

        info!(
            model = %self.model,
            content_kind = request.content.kind(),
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let raw = response.bytes().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);
            let detail = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            error!(%status, %detail, "Gemini request failed");
            return Err(AnalysisError::Provider(format!(
                "Gemini request failed: {}",
                detail
            )));
        }

        let body: Value = serde_json::from_slice(&raw).map_err(|e| {
            error!(%status, "Gemini returned a body that is not JSON: {}", e);
            AnalysisError::Provider(format!("Gemini returned a non-JSON response: {}", e))
        })?;

        Ok(response_text(&body))
    }
}

/// Request body for `models/{model}:generateContent`.
pub fn build_payload(request: &GenerationRequest) -> Value {
    let mut parts = vec![json!({ "text": request.user_text() })];

    if let ReportContent::Image { mime_type, data } = &request.content {
        parts.push(json!({
            "inlineData": {
                "mimeType": mime_type,
                "data": data
            }
        }));
    }

    json!({
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "contents": [
            {
                "role": "user",
                "parts": parts
            }
        ],
        "generationConfig": {
            "temperature": request.temperature,
            "responseMimeType": request.response_mime_type
        }
    })
}

/// Concatenated text parts of the first candidate, or `None` if there are none.
pub fn response_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;

    let text: String = parts
        .iter()
        .filter(|part| !part["thought"].as_bool().unwrap_or(false))
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() { None } else { Some(text) }
}
