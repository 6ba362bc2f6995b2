use std::fmt::Write;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use pantry_core::models::{AnalysisResult, AvailableIngredients, MatchStatus, Recipe};
use pantry_core::service::PantryService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    service: Arc<PantryService>,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct MatchForm {
    #[serde(default)]
    ingredients: String,
}

#[derive(Deserialize)]
struct MatchRequest {
    ingredients: String,
}

#[derive(Serialize)]
struct MatchResponse<'a> {
    available: AvailableIngredients,
    results: Vec<AnalysisResult<'a>>,
}

#[derive(Serialize)]
struct SubstitutesResponse {
    ingredient: String,
    substitutes: Vec<String>,
}

#[derive(Serialize)]
struct ReloadResponse {
    recipes: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; style-src 'unsafe-inline'; form-action 'self'"),
    );
    response
}

// --- HTML rendering ---

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn recipe_heading(recipe: &Recipe) -> String {
    escape_html(recipe.title().unwrap_or("(untitled)"))
}

fn render_result(html: &mut String, result: &AnalysisResult<'_>) {
    let title = recipe_heading(result.recipe);
    let _ = write!(html, "<li class=\"{}\"><strong>{title}</strong>", status_class(result));
    match result.status() {
        MatchStatus::Perfect => html.push_str(" &mdash; you have everything"),
        MatchStatus::WithSubstitutions => html.push_str(" &mdash; makeable with substitutions"),
        MatchStatus::Gapped => {
            let _ = write!(html, " &mdash; missing {}", result.missing_count);
        }
    }
    if !result.substitutions_required.is_empty() {
        html.push_str("<ul>");
        for sub in &result.substitutions_required {
            let _ = write!(
                html,
                "<li>{} &rarr; use {}</li>",
                escape_html(&sub.item),
                escape_html(&sub.substitutes.join(" or "))
            );
        }
        html.push_str("</ul>");
    }
    if !result.missing_items.is_empty() {
        let _ = write!(
            html,
            "<p>Missing: {}</p>",
            escape_html(&result.missing_items.join(", "))
        );
    }
    html.push_str("</li>");
}

fn status_class(result: &AnalysisResult<'_>) -> &'static str {
    match result.status() {
        MatchStatus::Perfect => "perfect",
        MatchStatus::WithSubstitutions => "substitutable",
        MatchStatus::Gapped => "gapped",
    }
}

fn render_page(input: &str, results: Option<&[AnalysisResult<'_>]>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>pantry</title>\
         <style>.perfect{color:#1b5e20}.substitutable{color:#e65100}.gapped{color:#555}</style>\
         </head><body><h1>What can I cook?</h1>\
         <form method=\"post\" action=\"/\">\
         <label for=\"ingredients\">Ingredients you have (comma-separated)</label><br>",
    );
    let _ = write!(
        html,
        "<input id=\"ingredients\" name=\"ingredients\" size=\"60\" value=\"{}\"> \
         <button type=\"submit\">Find recipes</button></form>",
        escape_html(input)
    );
    match results {
        Some([]) => html.push_str("<p>No recipes in the catalog.</p>"),
        Some(results) => {
            html.push_str("<ol>");
            for result in results {
                render_result(&mut html, result);
            }
            html.push_str("</ol>");
        }
        None => {}
    }
    html.push_str("</body></html>\n");
    html
}

// --- Handlers ---

async fn index() -> Html<String> {
    Html(render_page("", None))
}

async fn submit_form(State(state): State<AppState>, Form(form): Form<MatchForm>) -> Html<String> {
    let recipes = state.service.recipes();
    let results = state.service.rank(&recipes, &form.ingredients);
    Html(render_page(&form.ingredients, Some(&results)))
}

async fn match_recipes(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let recipes = state.service.recipes();
    let response = MatchResponse {
        available: AvailableIngredients::parse(&req.ingredients),
        results: state.service.rank(&recipes, &req.ingredients),
    };
    let value = serde_json::to_value(response).context("failed to serialize match results")?;
    Ok(Json(value))
}

async fn get_substitutes(
    State(state): State<AppState>,
    Path(ingredient): Path<String>,
) -> Result<Json<SubstitutesResponse>, ApiError> {
    let ingredient = pantry_core::models::normalize_ingredient(&ingredient);
    if ingredient.is_empty() {
        return Err(ApiError::BadRequest(
            "ingredient must not be empty".to_string(),
        ));
    }
    let substitutes = state.service.substitutes_for(&ingredient);
    Ok(Json(SubstitutesResponse {
        ingredient,
        substitutes,
    }))
}

async fn list_recipes(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let recipes = state.service.recipes();
    let value = serde_json::to_value(&*recipes).context("failed to serialize recipes")?;
    Ok(Json(value))
}

async fn reload_catalog(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let recipes = state
        .service
        .reload_catalog()
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(ReloadResponse { recipes }))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit_form))
        .route("/api/match", post(match_recipes))
        .route("/api/substitutes/{ingredient}", get(get_substitutes))
        .route("/api/recipes", get(list_recipes))
        .route("/api/catalog/reload", post(reload_catalog))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(service: PantryService, port: u16, bind: &str) -> anyhow::Result<()> {
    let source = service.catalog_source();
    let count = service.recipes().len();
    let state = AppState {
        service: Arc::new(service),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            "listening on {bind}: anyone on your network can reload the recipe catalog"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!(source = %source, recipes = count, "serving recipe catalog");
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
