use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Request, State, multipart::MultipartRejection},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    analysis::analyze_report,
    config::ServiceConfig,
    error::{AnalysisError, Result},
    models::{AnalysisResponse, UploadedFile},
    provider::{AnalysisProvider, GeminiProvider},
    ui::{PageState, SelectedFile, render_page},
};

pub const FILE_FIELD: &str = "file";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    /// `None` when no API key is configured.
    pub provider: Option<Arc<dyn AnalysisProvider>>,
}

impl AppState {
    pub fn new(config: ServiceConfig, provider: Option<Arc<dyn AnalysisProvider>>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let provider = GeminiProvider::from_config(&config)?
            .map(|provider| Arc::new(provider) as Arc<dyn AnalysisProvider>);

        if provider.is_none() {
            warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
        }

        Ok(Self::new(config, provider))
    }
}

pub fn create_app(config: ServiceConfig) -> Result<Router> {
    let app_state = AppState::from_config(config)?;
    Ok(build_router(app_state))
}

pub fn build_router(app_state: AppState) -> Router {
    let body_limit = match app_state.config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(upload_page))
        .route("/report", post(report_page))
        .route("/health", get(health_check))
        .route("/api", get(api_description))
        .route("/api/analyze", post(analyze))
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Tags every request with a correlation id and runs it inside a span.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header_value {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header_value {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn api_description() -> Json<Value> {
    Json(json!({
        "service": "HealthScan AI Report Analysis Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Educational interpretation of medical reports (PDF or image) via a generative AI provider",
        "endpoints": {
            "GET /": "Upload page",
            "POST /report": "Analyze an uploaded report and render the result page",
            "POST /api/analyze": "Analyze an uploaded report (multipart field 'file') and return JSON",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn upload_page() -> Html<String> {
    Html(render_page(&PageState::Idle))
}

async fn analyze(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<AnalysisResponse>, AnalysisError> {
    run_analysis(&state, multipart)
        .await
        .map(|analysis| Json(AnalysisResponse { analysis }))
}

async fn report_page(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let mut page = PageState::default();

    let file = match read_upload(multipart).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Rejected upload from page: {}", e);
            let page = PageState::Error {
                message: e.to_string(),
                last_file: None,
            };
            return (e.status_code(), Html(render_page(&page))).into_response();
        }
    };

    let selected = SelectedFile::new(
        file.file_name.clone(),
        file.bytes.len() as u64,
        file.mime_type.clone(),
    );
    if let Err(e) = page.begin(selected) {
        error!("Page state rejected new analysis: {}", e);
    }

    let outcome = analyze_report(state.provider.as_ref(), &file).await;
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            error!("Analysis error: {}", e);
            e.status_code()
        }
    };

    if let Err(e) = page.complete(outcome.map_err(|e| e.to_string())) {
        error!("Page state rejected analysis outcome: {}", e);
    }

    (status, Html(render_page(&page))).into_response()
}

async fn run_analysis(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<crate::models::AnalysisResult> {
    let file = read_upload(multipart).await.inspect_err(|e| {
        warn!("Rejected upload: {}", e);
    })?;

    info!(
        file_name = %file.file_name,
        mime_type = %file.mime_type,
        size_bytes = file.bytes.len(),
        "Received report upload"
    );

    analyze_report(state.provider.as_ref(), &file)
        .await
        .inspect_err(|e| error!("Analysis error: {}", e))
}

/// Pull the single `file` part out of the form. Other fields are ignored.
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile> {
    let mut multipart =
        multipart.map_err(|rejection| AnalysisError::InvalidUpload(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(AnalysisError::MissingFile);
        };
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        return Ok(UploadedFile::new(file_name, mime_type, bytes));
    }

    Err(AnalysisError::MissingFile)
}
