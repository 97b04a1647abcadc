//! health tool implementation.

use chrono::{SecondsFormat, Utc};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthOutput {
    pub status: String,
    /// RFC 3339 UTC time of the check.
    pub timestamp: String,
    pub service: String,
    pub version: String,
}

impl HealthOutput {
    pub fn now() -> Self {
        Self {
            status: "ok".into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            service: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Implementation of the health tool.
pub async fn health_impl() -> Result<CallToolResult, McpError> {
    json_result(&HealthOutput::now())
}
