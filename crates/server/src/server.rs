use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use serde_json::{Value, json};

use std::sync::Arc;

use crate::{ServerError, auth, budgets, categories, expenses, reports};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<auth::TokenService>,
}

impl ServerState {
    pub fn new(engine: Engine, tokens: auth::TokenService) -> Self {
        Self {
            engine: Arc::new(engine),
            tokens: Arc::new(tokens),
        }
    }
}

/// Resolve the bearer token into the current [`engine::User`].
///
/// Requests without a valid token never reach the handlers.
async fn require_bearer(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    };

    let claims = state.tokens.verify(bearer.token())?;
    let user = match state.engine.user(claims.sub).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            tracing::debug!(user_id = %claims.sub, "token for unknown user");
            return Err(ServerError::Unauthorized(
                "could not validate credentials".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn normalize_prefix(api_prefix: &str) -> Option<String> {
    let trimmed = api_prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Build the application router.
///
/// `/health` is always served at the root; every API route lives under
/// `api_prefix` (e.g. `/api`).
pub fn router(state: ServerState, api_prefix: &str) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(categories::update).delete(categories::delete),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/daily", get(reports::daily))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/{id}", delete(budgets::delete))
        .route("/reports/dashboard", get(reports::dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let api = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .merge(protected);

    let api = match normalize_prefix(api_prefix) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    api_prefix: &str,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state, api_prefix)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    api_prefix: String,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, &api_prefix, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("/api"), Some("/api".to_string()));
        assert_eq!(normalize_prefix("api/"), Some("/api".to_string()));
        assert_eq!(normalize_prefix("/"), None);
        assert_eq!(normalize_prefix(""), None);
    }
}
