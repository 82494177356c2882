//! Signup, login and logout endpoints for both account kinds.

use api_types::account::{AccountCreated, Credentials, ProviderSignup, SessionInfo, UserSignup};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    sessions::{AccountKind, SESSION_COOKIE, SessionIdentity},
};
use engine::{NewProvider, NewUser};

/// Handle `POST /signup/user`.
pub async fn signup_user(
    State(state): State<ServerState>,
    Json(payload): Json<UserSignup>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let id = state
        .engine
        .register_user(NewUser {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

/// Handle `POST /signup/provider`.
pub async fn signup_provider(
    State(state): State<ServerState>,
    Json(payload): Json<ProviderSignup>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let id = state
        .engine
        .register_provider(NewProvider {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            work: payload.work,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .build()
}

/// Handle `POST /login/user`.
pub async fn login_user(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> Result<(CookieJar, Json<SessionInfo>), ServerError> {
    let user = state
        .engine
        .authenticate_user(&payload.email, &payload.password)
        .await?;

    let token = state
        .sessions
        .insert(SessionIdentity {
            kind: AccountKind::User,
            account_id: user.id,
            display_name: user.name.clone(),
        })
        .await;

    Ok((
        jar.add(session_cookie(token)),
        Json(SessionInfo {
            account_id: user.id,
            name: user.name,
        }),
    ))
}

/// Handle `POST /login/provider`.
pub async fn login_provider(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> Result<(CookieJar, Json<SessionInfo>), ServerError> {
    let provider = state
        .engine
        .authenticate_provider(&payload.email, &payload.password)
        .await?;

    let token = state
        .sessions
        .insert(SessionIdentity {
            kind: AccountKind::Provider,
            account_id: provider.id,
            display_name: provider.name.clone(),
        })
        .await;

    Ok((
        jar.add(session_cookie(token)),
        Json(SessionInfo {
            account_id: provider.id,
            name: provider.name,
        }),
    ))
}

/// Handle `GET /logout` for either account kind.
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = Uuid::parse_str(cookie.value()) {
            state.sessions.remove(token).await;
        }
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/").build()),
        StatusCode::NO_CONTENT,
    )
}
