//! Murre API - fulltext pages and corpus registrations over HTTP

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use murre::corpus::{CorpusConfig, CorpusFolder};
use murre::error::MurreError;
use murre::highlight::match_token_ids;
use murre::location::Location;
use murre::page::TokenElement;
use murre::state::AppState;
use murre::store::PageKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

const DEFAULT_DATA_DIR: &str = "/opt/murre/data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const MAX_BODY_BYTES: usize = 1024 * 1024;

// === Request/Response types ===

#[derive(Deserialize)]
struct RangeQuery {
    range: Option<String>,
}

#[derive(Deserialize)]
struct HighlightQuery {
    loc: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    corpora: usize,
    uptime_seconds: i64,
}

#[derive(Serialize)]
struct CorpusSummary {
    id: String,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct PageResponse {
    corpus_id: String,
    sentence_id: String,
    tokens: Vec<TokenElement>,
    matched_token_ids: Vec<String>,
}

#[derive(Serialize)]
struct HighlightResponse {
    fragment: Option<String>,
    query: Option<String>,
    token_ids: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: MurreError) -> HandlerError {
    let status = match err {
        MurreError::NotFound(_) => StatusCode::NOT_FOUND,
        MurreError::InvalidCorpus(_) => StatusCode::BAD_REQUEST,
        MurreError::Database(_) | MurreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn load_page(state: &AppState, corpus_id: &str, sentence_id: &str) -> Result<murre::FulltextPage, MurreError> {
    let key = PageKey::new(corpus_id, sentence_id);
    let page = state
        .store
        .get(&key)
        .map_err(|e| MurreError::Database(e.to_string()))?
        .ok_or_else(|| {
            MurreError::NotFound(format!(
                "sentence '{}' in corpus '{}'",
                sentence_id, corpus_id
            ))
        })?;
    Ok((*page).clone())
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        corpora: state.registry.len(),
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn list_corpora(State(state): State<Arc<AppState>>) -> Json<Vec<CorpusSummary>> {
    let corpora = state
        .registry
        .iter()
        .map(|c| CorpusSummary {
            id: c.id.clone(),
            title: c.title.clone(),
            description: c.description.clone(),
        })
        .collect();
    Json(corpora)
}

async fn get_corpus(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CorpusConfig>, HandlerError> {
    state
        .registry
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(MurreError::NotFound(format!("corpus '{}'", id))))
}

async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, CorpusFolder>> {
    let folders = state
        .registry
        .folders()
        .map(|(name, folder)| (name.clone(), folder.clone()))
        .collect();
    Json(folders)
}

/// Resolve a raw page location to the token ids its match range addresses,
/// without touching any page.
async fn resolve_highlight(Query(params): Query<HighlightQuery>) -> Json<HighlightResponse> {
    let location = Location::from_url(&params.loc);
    let token_ids = match_token_ids(location.fragment(), location.query());
    Json(HighlightResponse {
        fragment: location.fragment().map(|s| s.to_string()),
        query: location.query().map(|s| s.to_string()),
        token_ids,
    })
}

/// Load a sentence page and apply the match range from the query string, if
/// any. A missing or malformed range serves the page unhighlighted.
async fn get_fulltext_page(
    State(state): State<Arc<AppState>>,
    Path((corpus_id, sentence_id)): Path<(String, String)>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<PageResponse>, HandlerError> {
    if state.registry.get(&corpus_id).is_none() {
        return Err(error_response(MurreError::NotFound(format!(
            "corpus '{}'",
            corpus_id
        ))));
    }

    let mut page = load_page(&state, &corpus_id, &sentence_id).map_err(error_response)?;
    let matched_token_ids = page.apply_matches(params.range.as_deref());

    Ok(Json(PageResponse {
        corpus_id,
        sentence_id,
        tokens: page.tokens().to_vec(),
        matched_token_ids,
    }))
}

/// Only the ids the range marks on an existing page.
async fn get_fulltext_matches(
    State(state): State<Arc<AppState>>,
    Path((corpus_id, sentence_id)): Path<(String, String)>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<String>>, HandlerError> {
    let mut page = load_page(&state, &corpus_id, &sentence_id).map_err(error_response)?;
    Ok(Json(page.apply_matches(params.range.as_deref())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let data_dir = std::env::var("MURRE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    let bind_addr =
        std::env::var("MURRE_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let state = Arc::new(AppState::new(data_dir)?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/corpora", get(list_corpora))
        .route("/corpora/:id", get(get_corpus))
        .route("/folders", get(list_folders))
        .route("/highlight", get(resolve_highlight))
        .route("/fulltext/:corpus/:sentence", get(get_fulltext_page))
        .route(
            "/fulltext/:corpus/:sentence/matches",
            get(get_fulltext_matches),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
