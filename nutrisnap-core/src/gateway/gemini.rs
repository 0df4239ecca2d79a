//! Gemini `generateContent` client with a structured JSON response.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AnalysisGateway, GatewayError};
use crate::models::{FoodAnalysis, MacroNutrients};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROMPT: &str = "Analise esta imagem de comida. Identifique o prato principal e estime \
as calorias e macronutrientes (proteína, carboidratos, gorduras). \
Forneça um breve comentário nutricional (analysis) sobre a qualidade da refeição em português. \
Se não for comida, retorne valores zerados e avise no campo 'analysis'.";

/// The six-field shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    name: String,
    calories: u32,
    protein: u32,
    carbs: u32,
    fats: u32,
    analysis: String,
}

impl From<AnalysisPayload> for FoodAnalysis {
    fn from(p: AnalysisPayload) -> Self {
        FoodAnalysis::new(
            p.name,
            MacroNutrients::new(p.calories, p.protein, p.carbs, p.fats),
            p.analysis,
        )
    }
}

/// Analysis gateway backed by Google's Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGateway {
    /// A missing key is accepted here and reported on the first call.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn credential(&self) -> Result<&str, GatewayError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingCredential)
    }
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<FoodAnalysis, GatewayError> {
        let api_key = self.credential()?;
        let payload = build_request(image, mime_type)?;

        tracing::debug!(
            "Sending {} byte {} image to {}",
            image.len(),
            mime_type,
            self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or(body),
            });
        }

        parse_response(&body)
    }
}

/// Request body for a single image with the structured-output schema.
fn build_request(image: &[u8], mime_type: &str) -> Result<Value, GatewayError> {
    if image.is_empty() {
        return Err(GatewayError::InvalidImage("image is empty".to_string()));
    }
    if mime_type.trim().is_empty() {
        return Err(GatewayError::InvalidImage("missing mime type".to_string()));
    }

    Ok(json!({
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": mime_type, "data": STANDARD.encode(image) } },
                { "text": PROMPT }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING", "description": "Nome curto do prato" },
                    "calories": { "type": "INTEGER", "description": "Calorias estimadas (kcal)" },
                    "protein": { "type": "INTEGER", "description": "Proteína em gramas" },
                    "carbs": { "type": "INTEGER", "description": "Carboidratos em gramas" },
                    "fats": { "type": "INTEGER", "description": "Gorduras em gramas" },
                    "analysis": { "type": "STRING", "description": "Breve comentário nutricional em pt-BR" }
                },
                "required": ["name", "calories", "protein", "carbs", "fats", "analysis"]
            }
        }
    }))
}

/// Extracts and validates the analysis from a `generateContent` response.
fn parse_response(body: &str) -> Result<FoodAnalysis, GatewayError> {
    let v: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if let Some(message) = v.get("error").and_then(|e| e["message"].as_str()) {
        return Err(GatewayError::Api {
            status: 200,
            message: message.to_string(),
        });
    }

    let text: String = v["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    let payload: AnalysisPayload = serde_json::from_str(strip_code_fence(&text))
        .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    Ok(payload.into())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

fn error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v["error"]["message"].as_str().map(str::to_string)
}
