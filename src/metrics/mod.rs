// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{gather_metrics, GEMINI_API_CALLS, GEMINI_API_DURATION, SOLVE_REQUESTS};

/// Helper to record the outcome of one solve click
pub fn record_solve(outcome: &str) {
    SOLVE_REQUESTS.with_label_values(&[outcome]).inc();
}

/// Helper to record Gemini API call metrics
pub fn record_gemini_call(model: &str, status: &str, duration_secs: f64) {
    GEMINI_API_CALLS.with_label_values(&[model, status]).inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}
