//! AWS Lambda handler for running mortgage simulations
//!
//! Accepts a simulation input (optionally with the bank whose rate it borrows)
//! and returns the computed schedule and metrics.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::collections::HashMap;
use std::sync::OnceLock;

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use mortgage_simulator::domain::Bank;
use mortgage_simulator::{
    AmortizationEngine, EngineConfig, MetricFailurePolicy, SimulationError, SimulationInput,
    SimulationOutput,
};

/// Request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub simulation: SimulationInput,

    /// Bank whose published rate the simulation borrows
    #[serde(default)]
    pub bank: Option<Bank>,

    /// Report non-converging metrics as unavailable instead of failing
    #[serde(default)]
    pub allow_unavailable_metrics: bool,
}

/// Response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<SimulationOutput>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Function URL response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

fn cors_headers() -> HashMap<String, String> {
    [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn respond(status_code: u16, body: &SimulationResponse) -> Result<UrlResponse, Error> {
    Ok(UrlResponse {
        status_code,
        headers: cors_headers(),
        body: Some(serde_json::to_string(body)?),
        is_base64_encoded: false,
    })
}

fn error_response(status_code: u16, message: String, start: std::time::Instant) -> Result<UrlResponse, Error> {
    respond(
        status_code,
        &SimulationResponse {
            output: None,
            execution_time_ms: start.elapsed().as_millis() as u64,
            error: Some(message),
        },
    )
}

/// Engine configuration read once from the environment
fn base_config() -> &'static EngineConfig {
    static CONFIG: OnceLock<EngineConfig> = OnceLock::new();
    CONFIG.get_or_init(|| EngineConfig::default().with_env_overrides())
}

fn status_for(err: &SimulationError) -> u16 {
    if err.is_validation() {
        400
    } else {
        422
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<UrlResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(UrlResponse {
            status_code: 200,
            headers: cors_headers(),
            body: None,
            is_base64_encoded: false,
        });
    }

    if request.is_base64_encoded {
        return error_response(400, "Binary request bodies are not supported".to_string(), start);
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let request: SimulationRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return error_response(400, format!("Invalid JSON: {}", e), start),
    };

    let mut input = request.simulation;
    if let Some(bank) = &request.bank {
        if let Err(e) = input.apply_bank_rate(bank) {
            return error_response(status_for(&e), e.to_string(), start);
        }
    }

    let mut config = base_config().clone();
    if request.allow_unavailable_metrics {
        config = config.with_failure_policy(MetricFailurePolicy::MarkUnavailable);
    }

    match AmortizationEngine::new(config).simulate(&input) {
        Ok(output) => {
            log::info!(
                "Simulated {} periods in {:?}",
                output.amortization_schedule.len(),
                start.elapsed()
            );
            respond(
                200,
                &SimulationResponse {
                    output: Some(output),
                    execution_time_ms: start.elapsed().as_millis() as u64,
                    error: None,
                },
            )
        }
        Err(e) => {
            log::warn!("Simulation rejected: {}", e);
            error_response(status_for(&e), e.to_string(), start)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
