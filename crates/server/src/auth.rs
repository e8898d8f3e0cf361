//! Authentication endpoints and bearer token handling.

use api_types::{
    auth::{Login, Signup, Token},
    user::UserView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and validates HS256 access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX / 1_000)),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, ServerError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, ServerError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp().max(0).unsigned_abs(),
            exp: expires_at.timestamp().max(0).unsigned_abs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|err| {
            tracing::error!("failed to sign token: {err}");
            ServerError::Generic("failed to issue token".to_string())
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ServerError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("rejected token: {err}");
                ServerError::Unauthorized("could not validate credentials".to_string())
            })
    }
}

pub(crate) fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at.fixed_offset(),
    }
}

/// Register a new user.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<Signup>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

/// Exchange email and password for a bearer token.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<Token>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let access_token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "issued access token");

    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Current authenticated user.
pub async fn me(Extension(user): Extension<engine::User>) -> Json<UserView> {
    Json(map_user(user))
}
