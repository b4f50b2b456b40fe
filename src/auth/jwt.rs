use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Access token claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub(crate) sub: String,
    pub exp: i64,
    pub iat: i64,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl JwtConfig {
    pub fn from_env(secret: String) -> Self {
        let issuer = std::env::var("JWT_ISSUER")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let audience = std::env::var("JWT_AUDIENCE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            secret,
            issuer,
            audience,
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &self.audience {
            validation.set_audience(&[audience]);
        }
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        if let Some(ref typ) = token_data.claims.typ {
            if typ != "access" {
                return Err(jsonwebtoken::errors::Error::from(
                    jsonwebtoken::errors::ErrorKind::InvalidToken,
                ));
            }
        }

        Ok(token_data.claims)
    }

    #[cfg(test)]
    pub fn create_token(
        &self,
        user_id: i64,
        username: &str,
        email: &str,
        typ: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
            email: email.to_string(),
            username: username.to_string(),
            document_id: Some(format!("user-doc-{user_id}")),
            typ: Some(typ.to_string()),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: None,
            audience: None,
        }
    }

    #[test]
    fn verifies_access_token() {
        let config = config();
        let token = config
            .create_token(7, "ann", "ann@example.com", "access")
            .unwrap();
        let claims = config.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.document_id.as_deref(), Some("user-doc-7"));
    }

    #[test]
    fn rejects_non_access_token() {
        let config = config();
        let token = config
            .create_token(7, "ann", "ann@example.com", "refresh")
            .unwrap();
        assert!(config.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = JwtConfig {
            secret: "other".to_string(),
            issuer: None,
            audience: None,
        }
        .create_token(7, "ann", "ann@example.com", "access")
        .unwrap();
        assert!(config().verify_token(&token).is_err());
    }
}
