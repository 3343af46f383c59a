pub mod api; // HTTP surface for the chat widget and staff dashboard
pub mod config;
pub mod generation; // Remote text-generation fallback client
pub mod models;
pub mod schedule; // Consultation slot picker
pub mod triage; // Symptom table, extraction, composer, turn engine

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the binary entry point.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
