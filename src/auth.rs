use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::error::ApiError;

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id of the caller
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// Validates bearer tokens and resolves admin rights
pub struct JwtVerifier {
    /// False for an empty secret, every token is then rejected
    configured: bool,
    decoding_key: DecodingKey,
    validation: Validation,
    admin_emails: Vec<String>,
}

impl JwtVerifier {
    pub fn new(secret: &str, admin_emails: &[String]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Provider tokens carry `aud: authenticated`, which we do not pin
        validation.validate_aud = false;

        Self {
            configured: !secret.trim().is_empty(),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            admin_emails: admin_emails.iter().map(|e| e.trim().to_lowercase()).collect(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        if !self.configured {
            tracing::error!("Bearer token rejected, no JWT secret configured");
            return Err(ApiError::Unauthorized("Authentication is not configured".to_string()));
        }
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                ApiError::Unauthorized(format!("Invalid token: {}", e))
            })
    }

    pub fn is_admin(&self, claims: &Claims) -> bool {
        claims
            .email
            .as_deref()
            .is_some_and(|email| self.admin_emails.contains(&email.to_lowercase()))
    }

    fn authenticate(&self, req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
        let auth_str = req
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Authorization must use Bearer scheme".to_string()))?;

        let claims = self.verify(token.trim())?;
        Ok(AuthenticatedUser {
            is_admin: self.is_admin(&claims),
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// The signed-in caller, extracted from the `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate_request(req))
    }
}

fn authenticate_request(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    match req.app_data::<web::Data<JwtVerifier>>() {
        Some(verifier) => verifier.authenticate(req),
        None => {
            tracing::error!("JwtVerifier is not registered as app data");
            Err(ApiError::Internal("Authentication is not configured".to_string()))
        }
    }
}

/// A caller whose email is on the admin list
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = authenticate_request(req).and_then(|user| {
            if user.is_admin {
                Ok(AdminUser(user))
            } else {
                tracing::warn!("Non-admin {} attempted a moderation action", user.id);
                Err(ApiError::Forbidden("Admin access required".to_string()))
            }
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn create_test_jwt(sub: &str, email: &str, expires_in_seconds: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + expires_in_seconds) as usize;
        let claims = Claims {
            sub: sub.to_string(),
            email: Some(email.to_string()),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(SECRET, &["Admin@Knot.app".to_string()])
    }

    fn request_with(token: &str) -> HttpRequest {
        TestRequest::default()
            .app_data(web::Data::new(verifier()))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request()
    }

    #[actix_web::test]
    async fn test_valid_token() {
        let token = create_test_jwt("user-1", "ada@knot.app", 3600, SECRET);
        let user = AuthenticatedUser::extract(&request_with(&token)).await.unwrap();

        assert_eq!(user.id, "user-1");
        assert_eq!(user.email.as_deref(), Some("ada@knot.app"));
        assert!(!user.is_admin);
    }

    #[actix_web::test]
    async fn test_expired_token_rejected() {
        let token = create_test_jwt("user-1", "ada@knot.app", -3600, SECRET);
        let result = AuthenticatedUser::extract(&request_with(&token)).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_wrong_secret_rejected() {
        let token = create_test_jwt("user-1", "ada@knot.app", 3600, "other-secret");
        let result = AuthenticatedUser::extract(&request_with(&token)).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_empty_secret_rejects_tokens_signed_with_it() {
        let verifier = JwtVerifier::new("", &[]);
        let token = create_test_jwt("user-1", "ada@knot.app", 3600, "");

        assert!(matches!(verifier.verify(&token), Err(ApiError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_missing_header_rejected() {
        let req = TestRequest::default()
            .app_data(web::Data::new(verifier()))
            .to_http_request();
        let result = AuthenticatedUser::extract(&req).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_admin_email_is_case_insensitive() {
        let token = create_test_jwt("admin-1", "admin@knot.APP", 3600, SECRET);
        let admin = AdminUser::extract(&request_with(&token)).await.unwrap();
        assert!(admin.0.is_admin);

        let token = create_test_jwt("user-1", "ada@knot.app", 3600, SECRET);
        let result = AdminUser::extract(&request_with(&token)).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }
}
