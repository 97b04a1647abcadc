//! metrics_summary and metrics_samples tool implementations.
//!
//! Timing aggregates and raw samples over the retained sample window.
//! Tool calls are recorded with method `tools/call` and the tool name as path.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::{AppState, EndpointSummary, PerformanceSample};

/// Output from the metrics_summary tool, keyed by `METHOD path`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummaryOutput {
    pub metrics: BTreeMap<String, EndpointSummary>,
}

/// Implementation of the metrics_summary tool.
pub async fn summary_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    json_result(&MetricsSummaryOutput { metrics: state.metrics.summarize() })
}

/// Parameters for the metrics_samples tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetricsSamplesParams {
    /// Only samples for this path, e.g. a tool name such as `docs_search`.
    #[serde(default)]
    pub path: Option<String>,

    /// Only samples for this method, e.g. `tools/call`.
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSamplesOutput {
    pub average_duration: f64,
    pub count: usize,
    pub samples: Vec<PerformanceSample>,
}

/// Implementation of the metrics_samples tool.
pub async fn samples_impl(state: &AppState, params: MetricsSamplesParams) -> Result<CallToolResult, McpError> {
    let path = params.path.as_deref();
    let method = params.method.as_deref();

    let samples = state.metrics.samples_matching(path, method);
    let average_duration = state.metrics.average_duration(path, method);
    json_result(&MetricsSamplesOutput { average_duration, count: samples.len(), samples })
}
