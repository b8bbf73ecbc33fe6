//! HTTP routes.
//!
//! The REST surface of the roster service. Enum-valued query parameters
//! (race, profession, order) are parsed here against their closed sets; an
//! unknown value is a 400 naming the parameter, never a store-level failure.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use roster_domain::{
    Page, Player, PlayerDraft, PlayerFilter, PlayerOrder, PlayerPatch, Profession, Race,
};

use crate::app::App;
use crate::use_cases::PlayerError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/rest/players", get(list_players).post(create_player))
        .route("/rest/players/count", get(count_players))
        .route(
            "/rest/players/{id}",
            get(get_player).post(update_player).delete(delete_player),
        )
}

async fn health() -> &'static str {
    "OK"
}

/// The eleven filter params plus order and paging, camelCase on the wire.
/// Enums and timestamps arrive untyped and are parsed in `filter_from`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayersQuery {
    name: Option<String>,
    title: Option<String>,
    race: Option<String>,
    profession: Option<String>,
    after: Option<i64>,
    before: Option<i64>,
    banned: Option<bool>,
    min_experience: Option<i32>,
    max_experience: Option<i32>,
    min_level: Option<i32>,
    max_level: Option<i32>,
    order: Option<String>,
    page_number: Option<u32>,
    page_size: Option<u32>,
}

fn filter_from(query: &PlayersQuery) -> Result<PlayerFilter, ApiError> {
    Ok(PlayerFilter {
        name: query.name.clone(),
        title: query.title.clone(),
        race: parse_param::<Race>("race", query.race.as_deref())?,
        profession: parse_param::<Profession>("profession", query.profession.as_deref())?,
        after: millis_param("after", query.after)?,
        before: millis_param("before", query.before)?,
        banned: query.banned,
        min_experience: query.min_experience,
        max_experience: query.max_experience,
        min_level: query.min_level,
        max_level: query.max_level,
    })
}

fn parse_param<T>(param: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| ApiError::BadRequest(format!("{param}: {e}")))
        })
        .transpose()
}

fn millis_param(param: &str, value: Option<i64>) -> Result<Option<DateTime<Utc>>, ApiError> {
    value
        .map(|millis| {
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| ApiError::BadRequest(format!("{param}: timestamp out of range")))
        })
        .transpose()
}

async fn list_players(
    State(app): State<Arc<App>>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let filter = filter_from(&query)?;
    let order = parse_param::<PlayerOrder>("order", query.order.as_deref())?.unwrap_or_default();
    let page = Page::new(query.page_number, query.page_size);

    let players = app.players.list(&filter, order, page).await?;
    Ok(Json(players))
}

async fn count_players(
    State(app): State<Arc<App>>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<i64>, ApiError> {
    let filter = filter_from(&query)?;
    let count = app.players.count(&filter).await?;
    Ok(Json(count))
}

async fn get_player(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Player>, ApiError> {
    let player = app.players.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(player))
}

async fn create_player(
    State(app): State<Arc<App>>,
    draft: Result<Json<PlayerDraft>, JsonRejection>,
) -> Result<Json<Player>, ApiError> {
    let Json(draft) = draft.map_err(bad_body)?;
    let created = app.players.create(draft).await?;
    Ok(Json(created))
}

async fn update_player(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
    patch: Result<Option<Json<PlayerPatch>>, JsonRejection>,
) -> Result<Json<Player>, ApiError> {
    let patch = patch.map_err(bad_body)?;
    let player = app
        .players
        .update(id, patch.map(|Json(p)| p))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(player))
}

/// A malformed body is the client's fault: same 400 class as every other
/// validation failure, keeping serde's "unknown variant" detail.
fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

async fn delete_player(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = app.players.delete(id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::OK)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<PlayerError> for ApiError {
    fn from(e: PlayerError) -> Self {
        match e {
            PlayerError::Validation(v) => {
                tracing::info!(error = %v, "rejected request");
                ApiError::BadRequest(v.to_string())
            }
            PlayerError::Repo(r) => {
                tracing::error!(error = %r, "store failure");
                ApiError::Internal(r.to_string())
            }
        }
    }
}
