use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use cookie::Cookie;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tracing::{debug, info, warn};

use crate::auth::{hash_password, verify_password};
use crate::db::{Link, Role};
use crate::exhibitions::{Exhibition, ExhibitionPatch};

use super::auth::{ensure_admin, session_token, SESSION_COOKIE};
use super::error::ApiError;
use super::responses::{
    biography, group_links, paintings, Biography, CreateExhibitionRequest, CredentialsRequest,
    ExhibitionCreatedResponse, HealthResponse, LinkCreatedResponse, LinkRequest, LinksResponse,
    LoginResponse, MessageResponse, Painting,
};
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(20)
            .burst_size(50)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .expect("default governor config is valid"),
    );

    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route(
            "/api/exhibitions",
            get(exhibitions_manage).post(exhibition_create),
        )
        .route("/api/exhibitions/public", get(exhibitions_public))
        .route(
            "/api/exhibitions/{id}",
            axum::routing::put(exhibition_update).delete(exhibition_delete),
        )
        .route("/api/paintings", get(paintings_list))
        .route("/api/biography", get(biography_show))
        .route("/api/links", get(links_public).post(link_create))
        .route(
            "/api/links/{id}",
            get(link_show).put(link_update).delete(link_delete),
        )
        .route("/api/manage-links", get(links_manage))
        .layer(GovernorLayer::new(governor_conf))
        .layer(tower_http::request_id::SetRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
            tower_http::request_id::MakeRequestUuid::default(),
        ))
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let exhibitions = state.exhibitions.list().await.ok().map(|all| all.len());
    Json(HealthResponse {
        status: "ok",
        exhibitions,
    })
}

// ----------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------

async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (username, password) = require_credentials(&body)?;

    let password_hash = hash_password(password);
    state.db.create_user(username, &password_hash, Role::User)?;
    info!(username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (username, password) = require_credentials(&body)?;

    let user = state
        .db
        .find_user(username)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        warn!(username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.create(user.username.clone(), user.role);
    info!(username = %user.username, role = user.role.as_str(), "login successful");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful",
            username: user.username,
            role: user.role,
            token,
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(token) = session_token(&headers, &jar) {
        state.sessions.remove(&token);
    }
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));

    (
        jar,
        Json(MessageResponse {
            message: "Logout successful",
        }),
    )
}

fn require_credentials(body: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
    match (body.username.as_deref(), body.password.as_deref()) {
        (Some(username), Some(password))
            if !username.trim().is_empty() && !password.trim().is_empty() =>
        {
            Ok((username, password))
        }
        _ => Err(ApiError::BadRequest("Username and password are required")),
    }
}

// ----------------------------------------------------------------------
// Exhibitions
// ----------------------------------------------------------------------

async fn exhibitions_manage(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<Vec<Exhibition>>, ApiError> {
    ensure_admin(&state, &headers, &jar)?;
    let exhibitions = state.exhibitions.list().await?;
    debug!(exhibitions = exhibitions.len(), "management listing requested");
    Ok(Json(exhibitions))
}

async fn exhibitions_public(
    State(state): State<AppState>,
) -> Result<Json<Vec<Exhibition>>, ApiError> {
    let exhibitions = state.exhibitions.list().await?;
    debug!(exhibitions = exhibitions.len(), "public listing requested");
    Ok(Json(exhibitions))
}

async fn exhibition_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<CreateExhibitionRequest>,
) -> Result<(StatusCode, Json<ExhibitionCreatedResponse>), ApiError> {
    ensure_admin(&state, &headers, &jar)?;

    let (Some(title), Some(description), Some(date)) = (body.title, body.description, body.date)
    else {
        return Err(ApiError::BadRequest("All fields are required"));
    };
    if title.trim().is_empty() || description.trim().is_empty() || date.trim().is_empty() {
        return Err(ApiError::BadRequest("All fields are required"));
    }

    let exhibition = state.exhibitions.create(title, description, date).await?;
    info!(id = exhibition.id, title = %exhibition.title, "exhibition added");

    Ok((
        StatusCode::CREATED,
        Json(ExhibitionCreatedResponse {
            message: "Exhibition added successfully",
            exhibition,
        }),
    ))
}

async fn exhibition_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(patch): Json<ExhibitionPatch>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_admin(&state, &headers, &jar)?;

    state
        .exhibitions
        .update(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Exhibition"))?;
    info!(id, "exhibition updated");

    Ok(Json(MessageResponse {
        message: "Exhibition updated successfully",
    }))
}

async fn exhibition_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_admin(&state, &headers, &jar)?;

    if !state.exhibitions.delete(id).await? {
        return Err(ApiError::NotFound("Exhibition"));
    }
    info!(id, "exhibition deleted");

    Ok(Json(MessageResponse {
        message: "Exhibition deleted successfully",
    }))
}

// ----------------------------------------------------------------------
// Static content
// ----------------------------------------------------------------------

async fn paintings_list() -> Json<Vec<Painting>> {
    Json(paintings())
}

async fn biography_show() -> Json<Biography> {
    Json(biography())
}

// ----------------------------------------------------------------------
// Links
// ----------------------------------------------------------------------

async fn links_public(State(state): State<AppState>) -> Result<Json<LinksResponse>, ApiError> {
    let rows = state.db.list_links()?;
    debug!(links = rows.len(), "grouped links requested");
    Ok(Json(group_links(rows)))
}

async fn links_manage(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<Vec<Link>>, ApiError> {
    ensure_admin(&state, &headers, &jar)?;
    let rows = state.db.list_links_all()?;
    debug!(links = rows.len(), "management links requested");
    Ok(Json(rows))
}

async fn link_show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Link>, ApiError> {
    let link = state.db.get_link(id)?.ok_or(ApiError::NotFound("Link"))?;
    Ok(Json(link))
}

async fn link_create(
    State(state): State<AppState>,
    Json(body): Json<LinkRequest>,
) -> Result<(StatusCode, Json<LinkCreatedResponse>), ApiError> {
    let (Some(name), Some(url)) = (body.name, body.url) else {
        return Err(ApiError::BadRequest("Name and URL are required"));
    };
    if name.trim().is_empty() || url.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and URL are required"));
    }
    let category = body.category.filter(|value| !value.trim().is_empty());

    let link = state.db.create_link(&name, &url, category.as_deref())?;
    info!(id = link.id, name = %link.name, "link created");

    Ok((
        StatusCode::CREATED,
        Json(LinkCreatedResponse {
            message: "Link created successfully",
            id: link.id,
        }),
    ))
}

async fn link_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state.db.get_link(id)?.ok_or(ApiError::NotFound("Link"))?;

    let name = body.name.unwrap_or(existing.name);
    let url = body.url.unwrap_or(existing.url);
    let category = body
        .category
        .filter(|value| !value.trim().is_empty())
        .or(existing.category);

    if !state.db.update_link(id, &name, &url, category.as_deref())? {
        return Err(ApiError::NotFound("Link"));
    }
    info!(id, "link updated");

    Ok(Json(MessageResponse {
        message: "Link updated successfully",
    }))
}

async fn link_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_link(id)? {
        return Err(ApiError::NotFound("Link"));
    }
    info!(id, "link deleted");

    Ok(Json(MessageResponse {
        message: "Link deleted successfully",
    }))
}
