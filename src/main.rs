use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use obesity_core::constants::{BMI_ROUNDING_ENV, MODEL_INFO_PATH_ENV, MODEL_PATH_ENV};
use obesity_core::{CoreConfig, ModelStore};

/// Main entry point for the obesity risk service
///
/// Resolves configuration, loads the classifier once and serves the REST API. A missing or
/// unreadable model is fatal: the server never binds without a model to serve. Swapping in
/// a retrained artifact afterwards is an explicit `POST /model/reload`.
///
/// # Environment Variables
/// - `OBESITY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `OBESITY_MODEL_PATH`: classifier artifact (default: "models/obesity_risk_model.json")
/// - `OBESITY_MODEL_INFO_PATH`: metadata sidecar (default: "models/model_info.json")
/// - `OBESITY_BMI_ROUNDING`: `exact` or `ceiling` (default: "exact")
///
/// # Errors
/// Returns an error if:
/// - the configuration is invalid,
/// - the model cannot be loaded, or
/// - the REST server fails to bind or run.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("obesity_run=info".parse()?)
                .add_directive("obesity_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("OBESITY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::from_values(
        std::env::var(MODEL_PATH_ENV).ok(),
        std::env::var(MODEL_INFO_PATH_ENV).ok(),
        std::env::var(BMI_ROUNDING_ENV).ok(),
    )?;
    tracing::info!(
        "++ Model {} (BMI rounding: {})",
        cfg.model_path().display(),
        cfg.bmi_rounding()
    );

    // Load before binding so a missing model aborts startup.
    let store = Arc::new(ModelStore::new(cfg.model_loader()));
    store.get_or_load()?;

    tracing::info!("++ Starting obesity risk REST on {}", rest_addr);
    api_rest::serve(&rest_addr, AppState::new(store, cfg.bmi_rounding())).await
}
