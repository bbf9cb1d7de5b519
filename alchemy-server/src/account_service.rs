use std::sync::Arc;

use alchemy_core::{default_image, validate_name, validate_password};
use alchemy_persistence::{
    AccountRepository, AchievementRepository, DailyChallengeRepository, ImageRepository,
    NewAccount,
};
use alchemy_types::{
    Account, AccountStatus, EditAccountRequest, ImagesResponse, LeaderboardEntry, LoginRequest,
    RegisterRequest, TokenResponse,
};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::auth::{AuthError, AuthService, generate_salt, hash_password, verify_password};
use crate::errors::ApiError;
use crate::lobby_manager::LobbyManager;

pub const DEFAULT_LEADERBOARD_LIMIT: u64 = 10;
pub const MAX_LEADERBOARD_LIMIT: u64 = 100;

pub struct AccountService {
    accounts: AccountRepository,
    images: ImageRepository,
    achievements: AchievementRepository,
    daily: DailyChallengeRepository,
    lobby_manager: Arc<LobbyManager>,
    auth_service: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        db: DatabaseConnection,
        lobby_manager: Arc<LobbyManager>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            images: ImageRepository::new(db.clone()),
            achievements: AchievementRepository::new(db.clone()),
            daily: DailyChallengeRepository::new(db),
            lobby_manager,
            auth_service,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Account, ApiError> {
        validate_name("username", &request.username)?;
        validate_password(&request.password)?;

        let images = self.images.list().await?;
        let image_name = default_image(&request.username, &images)
            .unwrap_or_default()
            .to_string();
        let salt = generate_salt();
        let created = self
            .accounts
            .create(NewAccount {
                username: request.username.clone(),
                password_hash: hash_password(&request.password, &salt),
                salt,
                image_name,
            })
            .await?;
        if !created {
            return Err(ApiError::Conflict(format!(
                "username {:?} is already taken",
                request.username
            )));
        }

        info!(username = %request.username, "Account registered");
        self.get(&request.username).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ApiError> {
        let account = self
            .accounts
            .find_model(&request.username)
            .await?
            .filter(|account| verify_password(&request.password, &account.salt, &account.password_hash))
            .ok_or(AuthError::InvalidCredentials)?;

        self.accounts
            .set_status(&account.username, AccountStatus::Online)
            .await?;
        let token = self.auth_service.issue_account_token(&account.username)?;
        info!(username = %account.username, "Logged in");
        Ok(TokenResponse { token })
    }

    /// Goes offline and closes the lobby this account owns, if any.
    pub async fn logout(&self, username: &str) -> Result<(), ApiError> {
        if self.accounts.find_model(username).await?.is_none() {
            return Err(ApiError::not_found("account"));
        }
        self.accounts
            .set_status(username, AccountStatus::Offline)
            .await?;
        if let Some(lobby_code) = self.lobby_manager.owned_lobby(username).await? {
            self.lobby_manager.leave_lobby(&lobby_code, username).await?;
        }
        info!(username, "Logged out");
        Ok(())
    }

    pub async fn get(&self, username: &str) -> Result<Account, ApiError> {
        self.accounts
            .find(username)
            .await?
            .ok_or_else(|| ApiError::not_found("account"))
    }

    pub async fn edit(&self, username: &str, request: EditAccountRequest) -> Result<Account, ApiError> {
        self.get(username).await?;

        if let Some(image_name) = &request.image_name {
            if !self.images.exists(image_name).await? {
                return Err(ApiError::not_found("image"));
            }
        }
        if let Some(password) = &request.password {
            validate_password(password)?;
        }

        if let Some(image_name) = &request.image_name {
            self.accounts.set_image(username, image_name).await?;
        }
        if let Some(password) = &request.password {
            let salt = generate_salt();
            self.accounts
                .set_password(username, &hash_password(password, &salt), &salt)
                .await?;
        }
        self.get(username).await
    }

    pub async fn images(&self) -> Result<ImagesResponse, ApiError> {
        Ok(ImagesResponse {
            names: self.images.list().await?,
        })
    }

    pub async fn delete(&self, username: &str) -> Result<(), ApiError> {
        self.get(username).await?;
        if self.lobby_manager.owned_lobby(username).await?.is_some() {
            return Err(ApiError::Conflict(
                "close your lobby before deleting the account".to_string(),
            ));
        }

        self.achievements.delete_for_account(username).await?;
        self.daily.delete_for_account(username).await?;
        self.accounts.delete(username).await?;
        info!(username, "Account deleted");
        Ok(())
    }

    pub async fn leaderboard(&self, limit: Option<u64>) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .min(MAX_LEADERBOARD_LIMIT);
        Ok(self.accounts.get_leaderboard(limit).await?)
    }
}
