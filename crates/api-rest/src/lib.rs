//! # API REST
//!
//! REST API for the obesity risk service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Mapping core errors onto HTTP status codes
//!
//! All domain logic lives in `obesity-core`; handlers only convert wire types and run a
//! [`RiskPipeline`] over the model currently held by the shared [`ModelStore`].

#![warn(rust_2018_idioms)]

pub mod wire;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use obesity_core::{
    BmiCalculator, BmiRounding, ModelStore, ObesityClass, PatientProfile, RiskError,
    RiskPipeline,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wire::{
    BmiReq, BmiRes, ConsistencyWarningRes, ErrorRes, HealthRes, ModelRes, PredictReq, PredictRes,
    RankedClassRes, SeverityRes,
};

/// Application state for the REST API server
///
/// Holds the model store and the process-wide BMI rounding mode. Each request builds its
/// pipeline from the store's current model, so a reload affects only later requests.
#[derive(Clone)]
pub struct AppState {
    store: Arc<ModelStore>,
    bmi_rounding: BmiRounding,
}

impl AppState {
    pub fn new(store: Arc<ModelStore>, bmi_rounding: BmiRounding) -> Self {
        Self {
            store,
            bmi_rounding,
        }
    }

    fn pipeline(&self) -> Result<RiskPipeline, ApiError> {
        Ok(RiskPipeline::new(self.store.get_or_load()?, self.bmi_rounding))
    }

    fn bmi_calculator(&self) -> BmiCalculator {
        BmiCalculator::new(self.bmi_rounding)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, model, reload_model, invalidate_model, severity, bmi, predict),
    components(schemas(
        HealthRes,
        ErrorRes,
        ModelRes,
        SeverityRes,
        BmiReq,
        BmiRes,
        PredictReq,
        PredictRes,
        RankedClassRes,
        ConsistencyWarningRes,
    ))
)]
struct ApiDoc;

/// Core error carried to the HTTP boundary.
///
/// Request errors map to `422 Unprocessable Entity` so the caller can correct and resubmit.
/// Everything else is a server-side fault and maps to `500`.
#[derive(Debug)]
pub struct ApiError(RiskError);

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_request_error() {
            tracing::debug!("rejected request: {}", self.0);
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            tracing::error!("assessment failed: {:?}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorRes {
            kind: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/model", get(model))
        .route("/model/reload", post(reload_model))
        .route("/model/cache", delete(invalidate_model))
        .route("/severity", get(severity))
        .route("/bmi", post(bmi))
        .route("/predict", post(predict))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the REST API on `addr` until the server stops.
///
/// # Errors
/// Returns an error if:
/// - the address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Obesity risk REST listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// The model is loaded before the server binds, so a reachable server is always ready to
/// serve predictions.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Obesity risk REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/model",
    responses(
        (status = 200, description = "Loaded model details", body = ModelRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Describe the loaded classifier
///
/// Returns the canonical classes in severity order alongside the classifier's own class list,
/// plus the active BMI rounding mode and the metadata sidecar when one was found at load.
#[axum::debug_handler]
async fn model(State(state): State<AppState>) -> Result<Json<ModelRes>, ApiError> {
    let loaded = state.store.get_or_load()?;
    let info = loaded
        .info()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| RiskError::ModelUnavailable(format!("cannot serialise metadata: {e}")))?;

    Ok(Json(ModelRes {
        classes: ObesityClass::all()
            .map(|class| class.label().to_string())
            .collect(),
        classifier_classes: loaded.classifier().classes().to_vec(),
        bmi_rounding: state.bmi_rounding.to_string(),
        info,
    }))
}

#[utoipa::path(
    post,
    path = "/model/reload",
    responses(
        (status = 200, description = "Replacement model details", body = ModelRes),
        (status = 500, description = "Reload failed; the previous model keeps serving", body = ErrorRes)
    )
)]
/// Reload the classifier artifact from disk
///
/// The replacement is loaded before it is swapped in. Requests already running keep the
/// model they started with; if loading fails the previous model stays in place.
#[axum::debug_handler]
async fn reload_model(State(state): State<AppState>) -> Result<Json<ModelRes>, ApiError> {
    state.store.reload()?;
    tracing::info!("model reloaded on request");
    model(State(state)).await
}

#[utoipa::path(
    delete,
    path = "/model/cache",
    responses(
        (status = 204, description = "Cached model dropped; the next request loads it again")
    )
)]
/// Drop the cached classifier
///
/// Requests already holding the old model finish with it. The next request loads the
/// artifact from disk on first use.
#[axum::debug_handler]
async fn invalidate_model(State(state): State<AppState>) -> StatusCode {
    state.store.invalidate();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/severity",
    responses(
        (status = 200, description = "Severity table, lowest rank first", body = [SeverityRes])
    )
)]
/// List the seven weight classes with their severity rank, tier and guidance
#[axum::debug_handler]
async fn severity(State(_state): State<AppState>) -> Json<Vec<SeverityRes>> {
    Json(
        ObesityClass::all()
            .map(|class| SeverityRes::from(class.entry()))
            .collect(),
    )
}

#[utoipa::path(
    post,
    path = "/bmi",
    request_body = BmiReq,
    responses(
        (status = 200, description = "Body mass index", body = BmiRes),
        (status = 422, description = "Invalid height or weight", body = ErrorRes)
    )
)]
/// Compute BMI under the server's configured rounding mode
#[axum::debug_handler]
async fn bmi(
    State(state): State<AppState>,
    Json(req): Json<BmiReq>,
) -> Result<Json<BmiRes>, ApiError> {
    let calculator = state.bmi_calculator();
    let bmi = calculator.compute(req.weight, req.height)?;
    Ok(Json(BmiRes {
        bmi,
        rounding: calculator.rounding().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/predict",
    request_body = PredictReq,
    responses(
        (status = 200, description = "Risk assessment", body = PredictRes),
        (status = 422, description = "Input outside the accepted domain", body = ErrorRes),
        (status = 500, description = "Classifier produced an inconsistent result", body = ErrorRes)
    )
)]
/// Assess obesity risk for one patient
///
/// Runs the full pipeline: BMI, canonical encoding, classification and interpretation. The
/// response carries a fresh assessment id and timestamp; nothing is stored server-side.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if:
/// - height or weight is not a positive number,
/// - a numeric answer falls outside its range, or
/// - a categorical answer is not recognised.
///
/// Returns `500 Internal Server Error` if the classifier's output is inconsistent.
#[axum::debug_handler]
async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictReq>,
) -> Result<Json<PredictRes>, ApiError> {
    let profile = PatientProfile::try_from(req)?;
    let assessment = state.pipeline()?.assess(&profile)?;

    let rounding = state.bmi_rounding;
    let res = PredictRes::from_assessment(&assessment, rounding.as_str()).map_err(|e| {
        RiskError::ClassifierContract(format!("cannot serialise feature record: {e}"))
    })?;

    tracing::info!(
        assessment_id = %res.assessment_id,
        label = %res.label,
        tier = %res.tier,
        "assessment served"
    );
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use obesity_core::{LinearClassifier, LoadedModel, ModelLoader, RiskResult};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    // Strongly favours Normal_Weight; everything else shares the remaining mass.
    const ARTIFACT: &str = r#"{
        "classes": [
            "Insufficient_Weight", "Normal_Weight", "Obesity_Type_I", "Obesity_Type_II",
            "Obesity_Type_III", "Overweight_Level_I", "Overweight_Level_II"
        ],
        "intercepts": [0.0, 6.0, 0.0, 0.0, 0.0, 0.5, 0.0],
        "coefficients": [{}, {}, {}, {}, {}, {}, {}]
    }"#;

    struct ArtifactLoader {
        loads: Arc<AtomicUsize>,
    }

    impl ModelLoader for ArtifactLoader {
        fn load(&self) -> RiskResult<LoadedModel> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let classifier = LinearClassifier::from_json_str(ARTIFACT)?;
            Ok(LoadedModel::new(Box::new(classifier), None))
        }
    }

    fn app_with_loads(rounding: BmiRounding) -> (Router, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let store = ModelStore::new(ArtifactLoader {
            loads: Arc::clone(&loads),
        });
        (router(AppState::new(Arc::new(store), rounding)), loads)
    }

    fn app(rounding: BmiRounding) -> Router {
        app_with_loads(rounding).0
    }

    fn profile_body() -> Value {
        json!({
            "age": 25,
            "height": 1.70,
            "weight": 70.0,
            "gender": "female",
            "family_history_overweight": true,
            "frequent_high_caloric_food": false,
            "vegetable_consumption": 2.0,
            "water_intake": 2.0,
            "meals_per_day": 3.0,
            "snacking": "Sometimes",
            "physical_activity": 2.0,
            "screen_time": 4.0,
            "smoker": false,
            "calorie_monitoring": false,
            "alcohol": "no",
            "transportation": "Automobile"
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(BmiRounding::Exact), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_predict_normal_weight() {
        let (status, body) = send(
            app(BmiRounding::Exact),
            "POST",
            "/predict",
            Some(profile_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], "Normal_Weight");
        assert_eq!(body["tier"], "healthy-range");
        assert_eq!(body["ranked"].as_array().unwrap().len(), 7);
        assert_eq!(body["top_3"].as_array().unwrap().len(), 3);
        assert_eq!(body["ranked"][0]["label"], "Normal_Weight");
        assert_eq!(body["probabilities"].as_object().unwrap().len(), 7);
        assert_eq!(body["features"]["physical_activity_freq"], "moderate_frequency");
        assert_eq!(body["features"]["gender"], 0);
        assert!(body["consistency_warning"].is_null());
        assert!(!body["recommendations"].as_array().unwrap().is_empty());
        assert!(uuid::Uuid::parse_str(body["assessment_id"].as_str().unwrap()).is_ok());

        let bmi = body["bmi"].as_f64().unwrap();
        assert!((bmi - 24.22).abs() < 0.01);

        let total: f64 = body["ranked"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["probability"].as_f64().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_predict_uses_configured_rounding() {
        let (status, body) = send(
            app(BmiRounding::Ceiling),
            "POST",
            "/predict",
            Some(profile_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmi"], 25.0);
        assert_eq!(body["bmi_rounding"], "ceiling");
    }

    #[tokio::test]
    async fn test_predict_rejects_out_of_domain() {
        let mut profile = profile_body();
        profile["screen_time"] = json!(13.0);

        let (status, body) = send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "OutOfDomain");
    }

    #[tokio::test]
    async fn test_predict_rejects_unknown_category() {
        let mut profile = profile_body();
        profile["transportation"] = json!("Teleport");

        let (status, body) = send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "InvalidCategory");
        assert!(body["message"].as_str().unwrap().contains("transportation"));
    }

    #[tokio::test]
    async fn test_predict_rejects_unknown_gender() {
        let mut profile = profile_body();
        profile["gender"] = json!("unknown");

        let (status, body) = send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "InvalidCategory");
    }

    #[tokio::test]
    async fn test_predict_rejects_unknown_fields() {
        let mut profile = profile_body();
        profile["favourite_colour"] = json!("blue");

        let (status, _) = send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_bmi_endpoint() {
        let (status, body) = send(
            app(BmiRounding::Exact),
            "POST",
            "/bmi",
            Some(json!({ "weight": 70.0, "height": 1.70 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rounding"], "exact");
        assert!((body["bmi"].as_f64().unwrap() - 24.2214).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_bmi_rejects_zero_height() {
        let (status, body) = send(
            app(BmiRounding::Exact),
            "POST",
            "/bmi",
            Some(json!({ "weight": 70.0, "height": 0.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_severity_table() {
        let (status, body) = send(app(BmiRounding::Exact), "GET", "/severity", None).await;
        assert_eq!(status, StatusCode::OK);

        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0]["label"], "Insufficient_Weight");
        assert_eq!(entries[6]["label"], "Obesity_Type_III");
        assert_eq!(entries[6]["tier"], "obese");
    }

    #[tokio::test]
    async fn test_model_details() {
        let (status, body) = send(app(BmiRounding::Exact), "GET", "/model", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classes"][0], "Insufficient_Weight");
        assert_eq!(body["classifier_classes"].as_array().unwrap().len(), 7);
        assert_eq!(body["bmi_rounding"], "exact");
        assert!(body["info"].is_null());
    }

    #[tokio::test]
    async fn test_predict_rejects_negative_and_fractional_age() {
        for age in [json!(-3), json!(25.5)] {
            let mut profile = profile_body();
            profile["age"] = age;

            let (status, body) =
                send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["kind"], "OutOfDomain");
            assert!(body["message"].as_str().unwrap().contains("age"));
        }
    }

    #[tokio::test]
    async fn test_predict_rejects_height_with_infinite_bmi() {
        let mut profile = profile_body();
        profile["height"] = json!(1e-200);

        let (status, body) = send(app(BmiRounding::Exact), "POST", "/predict", Some(profile)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_model_reload_loads_a_fresh_artifact() {
        let (app, loads) = app_with_loads(BmiRounding::Exact);

        let (status, _) = send(app.clone(), "GET", "/model", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let (status, body) = send(app.clone(), "POST", "/model/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classifier_classes"].as_array().unwrap().len(), 7);
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        let (status, _) = send(app, "POST", "/predict", Some(profile_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidated_model_loads_again_on_next_request() {
        let (app, loads) = app_with_loads(BmiRounding::Exact);

        let (status, _) = send(app.clone(), "POST", "/predict", Some(profile_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let (status, _) = send(app.clone(), "DELETE", "/model/cache", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let (status, _) = send(app, "POST", "/predict", Some(profile_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
