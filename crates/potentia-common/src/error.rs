//! Error taxonomy for the potency pipeline, plus the axum response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum PotencyError {
    /// The submitted SMILES string does not describe a parseable molecule.
    /// User-input error; nothing downstream of the parser runs.
    #[error("invalid molecular structure: {0}")]
    InvalidStructure(String),

    /// The external fingerprinting tool failed, timed out, or produced
    /// output we cannot read.
    #[error("descriptor computation failed: {0}")]
    DescriptorComputationFailed(String),

    /// The assembled feature vector does not match the schema the model
    /// was trained on. Internal consistency bug, never a user error.
    #[error("feature vector does not match model schema: {0}")]
    InvalidFeatureVector(String),

    /// The compound name-resolution service returned no match or failed.
    #[error("name resolution failed: {0}")]
    NameResolutionFailed(String),

    /// 2D depiction of a parsed molecule failed.
    #[error("depiction failed: {0}")]
    DepictionFailed(String),

    /// The pretrained model artifact could not be loaded. Fatal at startup.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PotencyError {
    /// Stable machine-readable tag for the structured error body.
    pub fn kind(&self) -> &'static str {
        match self {
            PotencyError::InvalidStructure(_) => "invalid_structure",
            PotencyError::DescriptorComputationFailed(_) => "descriptor_computation_failed",
            PotencyError::InvalidFeatureVector(_) => "invalid_feature_vector",
            PotencyError::NameResolutionFailed(_) => "name_resolution_failed",
            PotencyError::DepictionFailed(_) => "depiction_failed",
            PotencyError::ModelUnavailable(_) => "model_unavailable",
            PotencyError::Config(_) => "config",
            PotencyError::Io(_) => "io",
            PotencyError::Http(_) => "http",
            PotencyError::Csv(_) => "csv",
            PotencyError::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, PotencyError>;

/// Wrapper that turns a [`PotencyError`] into an HTTP response.
///
/// Input-validation errors keep their message; infrastructure errors are
/// logged with full detail and surfaced with a generic body so internal
/// paths and tool output never leak to the caller.
#[derive(Debug)]
pub struct ApiError(pub PotencyError);

impl From<PotencyError> for ApiError {
    fn from(err: PotencyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PotencyError::InvalidStructure(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            PotencyError::DescriptorComputationFailed(_) => (
                StatusCode::BAD_GATEWAY,
                "descriptor computation failed".to_string(),
            ),
            PotencyError::NameResolutionFailed(_) | PotencyError::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream service failure".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "request failed");
        } else {
            warn!(kind = self.0.kind(), error = %self.0, "request rejected");
        }

        let body = Json(serde_json::json!({
            "error": self.0.kind(),
            "message": message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_structure_maps_to_400() {
        let resp = ApiError(PotencyError::InvalidStructure("bad ring bond".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn tool_failure_maps_to_502() {
        let resp = ApiError(PotencyError::DescriptorComputationFailed(
            "exit status 1".into(),
        ))
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn schema_mismatch_maps_to_500() {
        let resp = ApiError(PotencyError::InvalidFeatureVector("wrong length".into()))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
