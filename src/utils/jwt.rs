// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppError,
    models::user::{Role, User},
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Capability of a logged-in administrator.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: i64,
    pub username: String,
}

/// Capability of a logged-in student.
#[derive(Debug, Clone)]
pub struct StudentSession {
    pub user_id: i64,
    pub username: String,
}

/// The verified caller of a request. Built once by `auth_middleware`
/// and narrowed to a role capability by the role middlewares.
#[derive(Debug, Clone)]
pub enum Session {
    Admin(AdminSession),
    Student(StudentSession),
}

impl Session {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;
        let username = claims.username.clone();

        Ok(match claims.role {
            Role::Admin => Session::Admin(AdminSession { user_id, username }),
            Role::Student => Session::Student(StudentSession { user_id, username }),
        })
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(user: &User, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects the
/// resulting `Session` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

    let claims = verify_jwt(token, &config.jwt_secret)?;
    let session = Session::from_claims(&claims)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must run AFTER `auth_middleware`. Replaces the generic `Session` with an
/// `AdminSession`, or rejects with 403.
pub async fn admin_middleware(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing session".to_string()))?;

    match session {
        Session::Admin(admin) => {
            req.extensions_mut().insert(admin);
            Ok(next.run(req).await)
        }
        Session::Student(_) => Err(AppError::Forbidden("Admin access required".to_string())),
    }
}

/// Axum Middleware: Student Authorization.
///
/// Must run AFTER `auth_middleware`. Replaces the generic `Session` with a
/// `StudentSession`, or rejects with 403.
pub async fn student_middleware(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing session".to_string()))?;

    match session {
        Session::Student(student) => {
            req.extensions_mut().insert(student);
            Ok(next.run(req).await)
        }
        Session::Admin(_) => Err(AppError::Forbidden("Student access required".to_string())),
    }
}
