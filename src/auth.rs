//! Bearer token verification and role checks.
//!
//! Requests carry `Authorization: Bearer <jwt>` issued by the identity
//! provider. The token's groups claim decides the caller's [`Role`]; manager
//! routes additionally require membership of the configured manager group.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

/// Access level granted to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Manager,
}

/// Verified identity of the caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
}

/// Decodes and validates HS256 tokens.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    groups_claim: String,
    manager_group: String,
}

impl JwtVerifier {
    pub fn new(secret: &str, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;

        match config.audience.as_deref() {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = config.issuer.as_deref() {
            validation.set_issuer(&[iss]);
            validation.required_spec_claims.insert("iss".to_string());
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            groups_claim: config.groups_claim.clone(),
            manager_group: config.manager_group.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Value>(token, &self.key, &self.validation)
            .map(|t| t.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AppError::Unauthorized("Invalid token".to_string())
            })?;

        let sub = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Token has no subject".to_string()))?
            .to_string();

        let is_manager = match claims.get(&self.groups_claim) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|g| g == self.manager_group),
            Some(Value::String(group)) => *group == self.manager_group,
            _ => false,
        };
        let role = if is_manager { Role::Manager } else { Role::User };

        Ok(Claims { sub, role })
    }
}

/// Authentication mode for the router.
pub enum Authenticator {
    /// Every request is an anonymous manager
    Disabled,
    Jwt(JwtVerifier),
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if config.disabled {
            warn!("Authentication disabled; every request is treated as a manager");
            return Ok(Self::Disabled);
        }
        match config.jwt_secret.as_deref() {
            Some(secret) => Ok(Self::Jwt(JwtVerifier::new(secret, config))),
            None => Err(AppError::Internal(
                "JWT_SECRET must be set unless AUTH_DISABLED is true".to_string(),
            )),
        }
    }

    /// Resolves the caller from the request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims> {
        let verifier = match self {
            Self::Disabled => {
                return Ok(Claims {
                    sub: "anonymous".to_string(),
                    role: Role::Manager,
                })
            }
            Self::Jwt(verifier) => verifier,
        };

        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        verifier.verify(token)
    }
}

/// Rejects requests without a valid token.
pub async fn require_user(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = auth.authenticate(req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Rejects requests whose token does not carry the manager group.
pub async fn require_manager(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = auth.authenticate(req.headers())?;
    if claims.role != Role::Manager {
        warn!(sub = %claims.sub, path = %req.uri().path(), "Manager route refused");
        return Err(AppError::Forbidden("Manager role required".to_string()));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..AuthConfig::default()
        }
    }

    fn token(claims: Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_verify_manager_group() {
        let verifier = JwtVerifier::new(SECRET, &config());
        let t = token(
            json!({"sub": "u-1", "exp": exp(), "cognito:groups": ["staff", "manager"]}),
            SECRET,
        );

        let claims = verifier.verify(&t).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn test_verify_without_groups_is_user() {
        let verifier = JwtVerifier::new(SECRET, &config());
        let t = token(json!({"sub": "u-2", "exp": exp()}), SECRET);
        assert_eq!(verifier.verify(&t).unwrap().role, Role::User);
    }

    #[test]
    fn test_verify_single_group_string() {
        let verifier = JwtVerifier::new(SECRET, &config());
        let t = token(
            json!({"sub": "u-7", "exp": exp(), "cognito:groups": "manager"}),
            SECRET,
        );
        assert_eq!(verifier.verify(&t).unwrap().role, Role::Manager);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = JwtVerifier::new(SECRET, &config());
        let t = token(json!({"sub": "u-3", "exp": exp()}), "other");
        assert!(matches!(verifier.verify(&t), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let verifier = JwtVerifier::new(SECRET, &config());
        let t = token(
            json!({"sub": "u-4", "exp": chrono::Utc::now().timestamp() - 600}),
            SECRET,
        );
        assert!(matches!(verifier.verify(&t), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_checks_issuer() {
        let verifier = JwtVerifier::new(
            SECRET,
            &AuthConfig {
                issuer: Some("https://idp.example".to_string()),
                ..config()
            },
        );
        let good = token(
            json!({"sub": "u-5", "exp": exp(), "iss": "https://idp.example"}),
            SECRET,
        );
        let bad = token(
            json!({"sub": "u-5", "exp": exp(), "iss": "https://elsewhere"}),
            SECRET,
        );
        assert!(verifier.verify(&good).is_ok());
        assert!(verifier.verify(&bad).is_err());
    }

    #[test]
    fn test_authenticate_missing_header() {
        let auth = Authenticator::from_config(&config()).unwrap();
        let result = auth.authenticate(&HeaderMap::new());
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_authenticate_bearer_header() {
        let auth = Authenticator::from_config(&config()).unwrap();
        let t = token(json!({"sub": "u-6", "exp": exp()}), SECRET);
        assert_eq!(auth.authenticate(&bearer(&t)).unwrap().sub, "u-6");
    }

    #[test]
    fn test_disabled_is_manager() {
        let auth = Authenticator::from_config(&AuthConfig {
            disabled: true,
            ..AuthConfig::default()
        })
        .unwrap();
        let claims = auth.authenticate(&HeaderMap::new()).unwrap();
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        assert!(Authenticator::from_config(&AuthConfig::default()).is_err());
    }
}
