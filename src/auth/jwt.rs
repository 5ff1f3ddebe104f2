use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    auth::claims::Claims,
    config::JwtConfig,
    error::{AppError, AppResult},
};

/// Fixed lifetime of an issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Holds JWT signing and verification keys with config data.
///
/// Built once from [`JwtConfig`] at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: TOKEN_TTL,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::internal("failed to create token").with_cause(e))
    }

    /// Signs a token for `email` that expires `TOKEN_TTL` from now.
    pub fn generate_token(&self, email: &str) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = self.sign(&claims)?;
        debug!(email = %email, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation()).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthorized("invalid or expired token").with_cause(e)
        })?;
        debug!(email = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    /// Returns the subject email of a valid token.
    pub fn verify_token(&self, token: &str) -> AppResult<String> {
        self.verify(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        })
    }

    fn claims_expiring_at(keys: &JwtKeys, exp: OffsetDateTime) -> Claims {
        Claims {
            sub: "ann@example.com".into(),
            iat: (exp - TimeDuration::hours(24)).unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        }
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.generate_token("ann@example.com").expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "ann@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 60 * 60 * 24);
        assert_eq!(keys.verify_token(&token).unwrap(), "ann@example.com");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.generate_token("ann@example.com").unwrap();
        let err = bad.verify_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys.generate_token("ann@example.com").unwrap();
        let err = bad_keys.verify(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn verify_rejects_expired_token_without_leeway() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let expired = claims_expiring_at(&keys, OffsetDateTime::now_utc() - TimeDuration::seconds(5));
        let token = keys.sign(&expired).unwrap();
        let err = keys.verify_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.generate_token("ann@example.com").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = keys
            .sign(&Claims {
                sub: "mallory@example.com".into(),
                ..keys.verify(&token).unwrap()
            })
            .unwrap();
        // Splice the forged payload onto the original signature.
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");
        assert!(keys.verify_token(&tampered).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(keys.verify_token("not.a.jwt").is_err());
        assert!(keys.verify_token("").is_err());
    }
}
