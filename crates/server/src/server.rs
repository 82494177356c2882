use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    accounts, payments, requests,
    sessions::{AccountKind, SESSION_COOKIE, SessionIdentity, SessionStore},
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub sessions: SessionStore,
}

async fn resolve_session(jar: &CookieJar, state: &ServerState) -> Option<SessionIdentity> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let token = Uuid::parse_str(cookie.value()).ok()?;
    state.sessions.get(token).await
}

/// Generates a middleware that admits only sessions of one account kind.
///
/// The resolved identity is inserted as a request extension; anything
/// else (no cookie, unknown token, wrong kind) is a plain 401 with no
/// hint about which check failed.
macro_rules! require_kind {
    ($fn_name:ident, $kind:expr) => {
        async fn $fn_name(
            State(state): State<ServerState>,
            jar: CookieJar,
            mut request: Request,
            next: Next,
        ) -> Result<Response, StatusCode> {
            let Some(identity) = resolve_session(&jar, &state).await else {
                return Err(StatusCode::UNAUTHORIZED);
            };
            if identity.kind != $kind {
                return Err(StatusCode::UNAUTHORIZED);
            }

            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
    };
}

require_kind!(require_user, AccountKind::User);
require_kind!(require_provider, AccountKind::Provider);

fn router(state: ServerState) -> Router {
    let user_routes = Router::new()
        .route("/profile/user", get(requests::history))
        .route("/submit_request", post(requests::submit))
        .route("/payment/{service_id}", get(payments::context))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let provider_routes = Router::new()
        .route("/profile/provider", get(requests::available))
        .route("/accept_job/{job_id}", post(requests::accept))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_provider,
        ));

    Router::new()
        .route("/signup/user", post(accounts::signup_user))
        .route("/signup/provider", post(accounts::signup_provider))
        .route("/login/user", post(accounts::login_user))
        .route("/login/provider", post(accounts::login_provider))
        .route("/logout", get(accounts::logout))
        .merge(user_routes)
        .merge(provider_routes)
        .with_state(state)
}

/// Build the application router. Exposed for integration tests.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        sessions: SessionStore::new(),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
