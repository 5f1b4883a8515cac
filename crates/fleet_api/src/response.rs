use fleet_core::error::TrackerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body back into JSON. Bodies built by this crate always parse.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Accept either a bare JSON object or an API-gateway style `{"body": ...}` envelope
/// whose body is an object, a JSON string, or null.
pub fn normalize_event(event: Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Null => Ok(json!({})),
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        _ => Err("Request body must be a JSON object".to_string()),
    }
}

pub fn status_for(error: &TrackerError) -> u16 {
    match error {
        TrackerError::Validation(_) => 400,
        TrackerError::NotFound(_) => 404,
        TrackerError::Conflict(_) => 409,
        TrackerError::InvariantViolation(_) | TrackerError::Config(_) | TrackerError::Store(_) => {
            500
        }
    }
}

pub fn tracker_error_response(error: &TrackerError) -> ApiResponse {
    let status_code = status_for(error);
    if status_code >= 500 {
        tracing::error!(code = error.code(), %error, "request failed");
    }
    error_response(
        status_code,
        json!({
            "error": error.code(),
            "message": error.to_string(),
        }),
    )
}

pub fn validation_error_response(message: &str) -> ApiResponse {
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

pub fn success_response(status_code: u16, payload: impl Serialize) -> ApiResponse {
    match serde_json::to_string(&payload) {
        Ok(body) => ApiResponse {
            status_code,
            headers: json!({"Content-Type": "application/json"}),
            body,
        },
        Err(error) => error_response(
            500,
            json!({
                "error": "serialization_error",
                "message": error.to_string(),
            }),
        ),
    }
}

pub fn error_response(status_code: u16, payload: Value) -> ApiResponse {
    ApiResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
