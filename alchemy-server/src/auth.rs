use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const ACCOUNT_SUBJECT: &str = "account";
pub const PLAYER_SUBJECT: &str = "player";

const SALT_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountClaims {
    pub username: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerClaims {
    pub player_name: String,
    pub lobby_code: String,
    pub has_account: bool,
    pub is_owner: bool,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Mints and checks the HMAC-SHA256 bearer tokens for accounts and players.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    fn lifetime(&self) -> (i64, i64) {
        let issued_at = Utc::now();
        (
            issued_at.timestamp(),
            (issued_at + self.token_ttl).timestamp(),
        )
    }

    pub fn issue_account_token(&self, username: &str) -> Result<String, AuthError> {
        let (iat, exp) = self.lifetime();
        let claims = AccountClaims {
            username: username.to_string(),
            sub: ACCOUNT_SUBJECT.to_string(),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn issue_player_token(
        &self,
        lobby_code: &str,
        player_name: &str,
        has_account: bool,
        is_owner: bool,
    ) -> Result<String, AuthError> {
        let (iat, exp) = self.lifetime();
        let claims = PlayerClaims {
            player_name: player_name.to_string(),
            lobby_code: lobby_code.to_string(),
            has_account,
            is_owner,
            sub: PLAYER_SUBJECT.to_string(),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    fn validate<T: DeserializeOwned>(&self, token: &str, subject: &str) -> Result<T, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.sub = Some(subject.to_string());
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<T>(bearer_token(token), &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {:?}", e);
                AuthError::from(e)
            })?;
        Ok(token_data.claims)
    }

    pub fn validate_account_token(&self, token: &str) -> Result<AccountClaims, AuthError> {
        self.validate(token, ACCOUNT_SUBJECT)
    }

    pub fn validate_player_token(&self, token: &str) -> Result<PlayerClaims, AuthError> {
        self.validate(token, PLAYER_SUBJECT)
    }

    /// Checks an `Authorization` header against the `{username}` path segment.
    pub fn authorize_account(
        &self,
        header: Option<&str>,
        username: &str,
    ) -> Result<AccountClaims, AuthError> {
        let claims = self.validate_account_token(header.ok_or(AuthError::MissingToken)?)?;
        if claims.username != username {
            return Err(AuthError::ClaimMismatch);
        }
        Ok(claims)
    }

    /// Checks an `Authorization` header against the `{code}/{player}` path segments.
    pub fn authorize_player(
        &self,
        header: Option<&str>,
        lobby_code: &str,
        player_name: &str,
    ) -> Result<PlayerClaims, AuthError> {
        let claims = self.validate_player_token(header.ok_or(AuthError::MissingToken)?)?;
        if claims.lobby_code != lobby_code || claims.player_name != player_name {
            return Err(AuthError::ClaimMismatch);
        }
        Ok(claims)
    }

    pub fn authorize_owner(
        &self,
        header: Option<&str>,
        lobby_code: &str,
        player_name: &str,
    ) -> Result<PlayerClaims, AuthError> {
        let claims = self.authorize_player(header, lobby_code, player_name)?;
        if !claims.is_owner {
            return Err(AuthError::NotOwner);
        }
        Ok(claims)
    }
}

/// Strips an optional `Bearer ` prefix.
pub fn bearer_token(header: &str) -> &str {
    let header = header.trim();
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::rng().fill(&mut salt);
    STANDARD.encode(salt)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, password_hash: &str) -> bool {
    hash_password(password, salt) == password_hash
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token does not match the requested resource")]
    ClaimMismatch,
    #[error("Only the lobby owner can do that")]
    NotOwner,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account already owns a lobby")]
    AlreadyOwner,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}
