use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope shared by every JSON response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Machine-readable error code, only present on failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            code: None,
            message,
            errors: None,
        }
    }

    pub fn error(
        code: &str,
        message: Option<String>,
        errors: Option<Vec<String>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            code: Some(code.to_string()),
            message,
            errors,
        }
    }
}
