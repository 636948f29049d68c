use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use corelex_db::CorelexDb;
use corelex_listing::{
    DisplayRow, GroupingMode, ListingError, group_nouns_by_polysemous_type, group_with_mode,
    index_basic_types,
};
use corelex_morphy::NounMorphy;
use corelex_types::{BasicType, Noun, normalize_noun};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::pages::{self, SearchView};
use crate::search::{parse_noun_query, search_noun};

const HTML_CACHE: &str = "public, max-age=3600";
const JSON_CACHE: &str = "public, max-age=300";
const INCONSISTENT: &str = "data inconsistency";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<CorelexDb>,
    pub morphy: Arc<NounMorphy>,
    pub grouping: GroupingMode,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct TypeQuery {
    pub id: Option<String>,
    pub noun: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub noun: Option<String>,
}

#[derive(Serialize)]
struct TypeRowJson<'a> {
    corelex_type: Option<&'a str>,
    polysemous_type: &'a str,
    synsets: &'a str,
}

#[derive(Serialize)]
struct TypesResponse<'a> {
    rows: Vec<TypeRowJson<'a>>,
}

#[derive(Serialize)]
struct BasicTypeJson<'a> {
    code: &'a str,
    synset_id: &'a str,
    synset_elements: &'a str,
}

#[derive(Serialize)]
struct BasicTypesResponse<'a> {
    items: Vec<BasicTypeJson<'a>>,
}

#[derive(Serialize)]
struct NounJson<'a> {
    noun: &'a str,
    polysemous_type: &'a str,
    corelex_type: &'a str,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    noun: &'a str,
    lemma: Option<&'a str>,
    matches: Vec<NounJson<'a>>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/types", get(types_page))
        .route("/type", get(type_page))
        .route("/basic-types", get(basic_types_page))
        .route("/search", get(search_page))
        .route("/robots.txt", get(robots))
        .route("/healthz", get(healthz))
        .route("/v1/types", get(api_types))
        .route("/v1/basic-types", get(api_basic_types))
        .route("/v1/search", get(api_search))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn robots() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        "User-agent: *\nDisallow: /",
    )
}

fn cached(state: &AppState, policy: &'static str, response: impl IntoResponse) -> Response {
    if state.disable_cache {
        return response.into_response();
    }
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(policy))],
        response,
    )
        .into_response()
}

/// Grouped rows for one type, or all types when `filter` is `None`.
fn display_rows<'a>(
    state: &'a AppState,
    filter: Option<&str>,
) -> Result<Vec<DisplayRow<'a>>, ListingError> {
    let basic_types = state.db.fetch_basic_types();
    let index = index_basic_types(&basic_types);
    let rows = state.db.fetch_corelex_types(filter);
    group_with_mode(&rows, &index, state.grouping)
}

async fn home(State(state): State<AppState>) -> Response {
    cached(&state, HTML_CACHE, Html(pages::home_html()))
}

async fn types_page(State(state): State<AppState>) -> Result<Response, PageError> {
    let rows = display_rows(&state, None)?;
    Ok(cached(&state, HTML_CACHE, Html(pages::types_html(&rows))))
}

async fn type_page(
    State(state): State<AppState>,
    Query(params): Query<TypeQuery>,
) -> Result<Response, PageError> {
    let id = params
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(PageError::BadRequest("id is required"))?;
    if !state.db.corelex_type_exists(id) {
        return Err(PageError::NotFound);
    }

    let rows = display_rows(&state, Some(id))?;
    let type_rows = state.db.fetch_corelex_types(Some(id));
    let nouns = state.db.fetch_nouns(id);
    let groups = group_nouns_by_polysemous_type(&type_rows, &nouns);
    let highlight = params.noun.as_deref().map(normalize_noun);

    Ok(cached(
        &state,
        HTML_CACHE,
        Html(pages::type_html(id, &rows, &groups, highlight.as_deref())),
    ))
}

async fn basic_types_page(State(state): State<AppState>) -> Response {
    let basic_types = state.db.fetch_basic_types();
    cached(
        &state,
        HTML_CACHE,
        Html(pages::basic_types_html(&basic_types)),
    )
}

async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let raw = params.noun.unwrap_or_default();
    let html = match parse_noun_query(&raw) {
        Ok(None) => pages::search_html(&SearchView::Empty),
        Ok(Some(noun)) => {
            let outcome = search_noun(&state.db, &state.morphy, &noun);
            info!(
                noun = %outcome.noun,
                lemma = outcome.lemma.as_deref(),
                matches = outcome.matches.len(),
                "search"
            );
            pages::search_html(&SearchView::Outcome(&outcome))
        }
        Err(_) => {
            let page = pages::search_html(&SearchView::Rejected { raw: raw.trim() });
            return (StatusCode::BAD_REQUEST, Html(page)).into_response();
        }
    };
    cached(&state, HTML_CACHE, Html(html))
}

async fn api_types(
    State(state): State<AppState>,
    Query(params): Query<TypeQuery>,
) -> Result<Response, ApiError> {
    let filter = params
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if let Some(id) = filter
        && !state.db.corelex_type_exists(id)
    {
        return Err(ApiError::NotFound(format!("unknown corelex type {id}")));
    }

    let rows = display_rows(&state, filter)?;
    let response = TypesResponse {
        rows: rows
            .iter()
            .map(|row| TypeRowJson {
                corelex_type: row.corelex_type,
                polysemous_type: row.polysemous_type,
                synsets: &row.synsets,
            })
            .collect(),
    };
    Ok(cached(&state, JSON_CACHE, Json(response)))
}

async fn api_basic_types(State(state): State<AppState>) -> Response {
    let basic_types = state.db.fetch_basic_types();
    let response = BasicTypesResponse {
        items: basic_types.iter().map(basic_type_json).collect(),
    };
    cached(&state, JSON_CACHE, Json(response))
}

fn basic_type_json<'a>(bt: &BasicType<'a>) -> BasicTypeJson<'a> {
    BasicTypeJson {
        code: bt.code,
        synset_id: bt.synset_id,
        synset_elements: bt.synset_elements,
    }
}

fn noun_json<'a>(noun: &Noun<'a>) -> NounJson<'a> {
    NounJson {
        noun: noun.noun,
        polysemous_type: noun.polysemous_type,
        corelex_type: noun.corelex_type,
    }
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let noun = parse_noun_query(params.noun.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .ok_or_else(|| ApiError::bad_request("noun is required"))?;

    let outcome = search_noun(&state.db, &state.morphy, &noun);
    let response = SearchResponse {
        noun: &outcome.noun,
        lemma: outcome.lemma.as_deref(),
        matches: outcome.matches.iter().map(noun_json).collect(),
    };
    Ok(cached(&state, JSON_CACHE, Json(response)))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("data inconsistency")]
    Inconsistent,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        error!("{INCONSISTENT}: {err}");
        ApiError::Inconsistent
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Inconsistent => (StatusCode::INTERNAL_SERVER_ERROR, INCONSISTENT.to_string()),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Errors of the HTML pages, rendered as HTML.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("not found")]
    NotFound,
    #[error("data inconsistency")]
    Inconsistent,
}

impl From<ListingError> for PageError {
    fn from(err: ListingError) -> Self {
        error!("{INCONSISTENT}: {err}");
        PageError::Inconsistent
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            PageError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", *msg),
            PageError::NotFound => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "No such CoreLex type.",
            ),
            PageError::Inconsistent => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "The CoreLex data is inconsistent; this page cannot be shown.",
            ),
        };
        (status, Html(pages::error_html(title, message))).into_response()
    }
}
