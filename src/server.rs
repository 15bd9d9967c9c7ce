use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::ai::{
    analyze_content, provider_from_config, resolve_mentions, schedule_commentary, AnalysisResult,
    ContentType, Language, ResolvedMention,
};
use crate::catalog::{Catalog, Nutrient, Product};
use crate::config::Config;
use crate::detector::{detect_conflicts, detect_synergies, Conflict, Synergy};
use crate::rules::RuleTable;
use crate::scheduler::{generate_schedule, validate_schedule, ScheduleConstraints, ScheduleSlot};
use crate::store::{ScheduleRecord, StackStore};

#[derive(Clone)]
struct ApiState {
    config: Config,
    catalog: &'static Catalog,
    rules: &'static RuleTable,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// Product selection shared by the analysis endpoints: catalog ids, a saved
/// stack name, and/or fully-shaped inline products for ad hoc items.
#[derive(Debug, Clone, Default, Deserialize)]
struct StackRequest {
    products: Option<Vec<String>>,
    stack: Option<String>,
    #[serde(default)]
    inline_products: Vec<Product>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConflictsRequest {
    #[serde(flatten)]
    selection: StackRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ScheduleRequest {
    #[serde(flatten)]
    selection: StackRequest,
    constraints: Option<ScheduleConstraints>,
    #[serde(default)]
    commentary: bool,
    language: Option<String>,
    #[serde(default = "default_true")]
    persist_history: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalyzeRequest {
    content: String,
    content_type: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommentaryRequest {
    #[serde(default)]
    slots: Vec<ScheduleSlot>,
    #[serde(default)]
    conflicts: Vec<Conflict>,
    #[serde(default)]
    synergies: Vec<Synergy>,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ConflictsResponse {
    conflicts: Vec<Conflict>,
    synergies: Vec<Synergy>,
}

#[derive(Debug, Serialize)]
struct ScheduleResponse {
    slots: Vec<ScheduleSlot>,
    conflicts: Vec<Conflict>,
    synergies: Vec<Synergy>,
    violations: Vec<String>,
    commentary: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    analysis: AnalysisResult,
    resolved: Vec<ResolvedMention>,
}

#[derive(Debug, Serialize)]
struct CommentaryResponse {
    commentary: String,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        db_path: config.resolved_db_path(),
        config,
        catalog: Catalog::builtin(),
        rules: RuleTable::builtin(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/products", get(products))
        .route("/v1/nutrients", get(nutrients))
        .route("/v1/config", get(show_config))
        .route("/v1/conflicts", post(conflicts))
        .route("/v1/schedule", post(schedule))
        .route("/v1/analyze", post(analyze))
        .route("/v1/commentary", post(commentary))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn products(State(state): State<ApiState>) -> Json<ApiResponse<Vec<Product>>> {
    ok(state.catalog.products().cloned().collect())
}

async fn nutrients(State(state): State<ApiState>) -> Json<ApiResponse<Vec<Nutrient>>> {
    ok(state.catalog.nutrients().cloned().collect())
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn conflicts(
    State(state): State<ApiState>,
    Json(request): Json<ConflictsRequest>,
) -> ApiResult<ConflictsResponse> {
    let stack = resolve_stack(&state, &request.selection)?;
    let conflicts = detect_conflicts(&stack, state.catalog, state.rules)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let synergies = detect_synergies(&stack, state.catalog, state.rules)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(ok(ConflictsResponse {
        conflicts,
        synergies,
    }))
}

async fn schedule(
    State(state): State<ApiState>,
    Json(request): Json<ScheduleRequest>,
) -> ApiResult<ScheduleResponse> {
    let stack = resolve_stack(&state, &request.selection)?;
    let constraints = request
        .constraints
        .unwrap_or_else(|| state.config.constraints());

    let conflicts = detect_conflicts(&stack, state.catalog, state.rules)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let synergies = detect_synergies(&stack, state.catalog, state.rules)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let slots = generate_schedule(&stack, &conflicts, &constraints)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let violations = validate_schedule(&slots, &conflicts);

    // Vendor failures degrade to fallback text inside schedule_commentary;
    // the schedule itself never depends on the LLM call.
    let commentary = if request.commentary {
        let language = parse_language(request.language.as_deref(), &state.config)?;
        let provider = provider_from_config(&state.config.ai);
        Some(schedule_commentary(provider.as_ref(), &slots, &conflicts, &synergies, language).await)
    } else {
        None
    };

    if request.persist_history {
        let store = open_store(&state)?;
        let record = ScheduleRecord {
            stack_name: request
                .selection
                .stack
                .clone()
                .unwrap_or_else(|| "(unsaved)".to_string()),
            product_count: stack.len(),
            conflict_count: conflicts.len(),
            slots: slots.clone(),
            generated_at: Utc::now(),
        };
        store
            .insert_schedule_record(&record)
            .map_err(ApiError::internal)?;
    }

    Ok(ok(ScheduleResponse {
        slots,
        conflicts,
        synergies,
        violations,
        commentary,
    }))
}

async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("content cannot be empty"));
    }
    let content_type = match request.content_type.as_deref() {
        Some(raw) => {
            ContentType::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))?
        }
        None => ContentType::default(),
    };
    let language = parse_language(request.language.as_deref(), &state.config)?;

    let provider = provider_from_config(&state.config.ai);
    let analysis = analyze_content(provider.as_ref(), &request.content, content_type, language)
        .await
        .map_err(ApiError::internal)?;
    let resolved = resolve_mentions(state.catalog, &analysis);

    Ok(ok(AnalyzeResponse { analysis, resolved }))
}

async fn commentary(
    State(state): State<ApiState>,
    Json(request): Json<CommentaryRequest>,
) -> ApiResult<CommentaryResponse> {
    let language = parse_language(request.language.as_deref(), &state.config)?;
    let provider = provider_from_config(&state.config.ai);
    let commentary = schedule_commentary(
        provider.as_ref(),
        &request.slots,
        &request.conflicts,
        &request.synergies,
        language,
    )
    .await;
    Ok(ok(CommentaryResponse { commentary }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn default_true() -> bool {
    true
}

fn open_store(state: &ApiState) -> std::result::Result<StackStore, ApiError> {
    StackStore::open(&state.db_path).map_err(ApiError::internal)
}

fn parse_language(
    raw: Option<&str>,
    config: &Config,
) -> std::result::Result<Language, ApiError> {
    let raw = raw.unwrap_or(config.ai.language.as_str());
    Language::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Resolve the request's product selection against catalog, saved stacks,
/// and inline products, in that order.
fn resolve_stack(
    state: &ApiState,
    selection: &StackRequest,
) -> std::result::Result<Vec<Product>, ApiError> {
    let mut stack = Vec::new();

    if let Some(ids) = &selection.products {
        stack.extend(
            state
                .catalog
                .resolve_products(ids)
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        );
    }

    if let Some(name) = &selection.stack {
        let store = open_store(state)?;
        let saved = store
            .load_stack(name)
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::bad_request(format!("unknown stack: {name}")))?;
        stack.extend(
            state
                .catalog
                .resolve_products(&saved.product_ids)
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        );
    }

    stack.extend(selection.inline_products.iter().cloned());

    if stack.is_empty() && selection.products.is_none() && selection.stack.is_none() {
        stack.extend(
            state
                .catalog
                .resolve_products(&state.config.stack.products)
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        );
    }

    if stack.is_empty() {
        return Err(ApiError::bad_request(
            "no products selected; pass products, inline_products, or a stack name",
        ));
    }
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ApiState {
        ApiState {
            config: Config::default(),
            catalog: Catalog::builtin(),
            rules: RuleTable::builtin(),
            db_path: PathBuf::from("/tmp/suppstack-test.db"),
        }
    }

    #[test]
    fn resolves_catalog_ids_and_inline_products() {
        let selection = StackRequest {
            products: Some(vec!["nm-iron".to_string()]),
            stack: None,
            inline_products: vec![Product::adhoc("Custom Blend")],
        };
        let stack = resolve_stack(&state(), &selection).expect("selection resolves");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn unknown_product_id_is_a_bad_request() {
        let selection = StackRequest {
            products: Some(vec!["no-such-id".to_string()]),
            stack: None,
            inline_products: Vec::new(),
        };
        let error = resolve_stack(&state(), &selection).unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_selection_is_a_bad_request() {
        let selection = StackRequest::default();
        let error = resolve_stack(&state(), &selection).unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn language_falls_back_to_config() {
        let language = parse_language(None, &Config::default()).expect("default language");
        assert_eq!(language, Language::En);
        assert!(parse_language(Some("klingon"), &Config::default()).is_err());
    }
}
