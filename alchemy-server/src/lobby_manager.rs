use std::sync::Arc;

use alchemy_core::{Broadcast, default_image, validate_duration, validate_lobby_name, validate_name};
use alchemy_persistence::{AccountRepository, ImageRepository, LobbyRepository, NewPlayer};
use alchemy_types::{
    CreateLobbyResponse, EditLobbyRequest, EventTag, JoinLobbyRequest, JoinLobbyResponse,
    LobbiesView, LobbyView,
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::auth::{AuthError, AuthService};
use crate::errors::ApiError;
use crate::events::EventBus;
use crate::registry::SessionRegistry;

pub const LOBBY_CODE_LENGTH: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 16;

fn random_lobby_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(LOBBY_CODE_LENGTH)
        .map(char::from)
        .collect()
}

pub struct LobbyManager {
    lobbies: LobbyRepository,
    accounts: AccountRepository,
    images: ImageRepository,
    auth_service: Arc<AuthService>,
    bus: Arc<EventBus>,
}

impl LobbyManager {
    pub fn new(db: DatabaseConnection, auth_service: Arc<AuthService>, bus: Arc<EventBus>) -> Self {
        Self {
            lobbies: LobbyRepository::new(db.clone()),
            accounts: AccountRepository::new(db.clone()),
            images: ImageRepository::new(db),
            auth_service,
            bus,
        }
    }

    fn registry(&self) -> &Arc<SessionRegistry> {
        self.bus.registry()
    }

    async fn unused_lobby_code(&self) -> Result<String, ApiError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_lobby_code();
            if !self.lobbies.code_exists(&code).await? {
                return Ok(code);
            }
        }
        Err(ApiError::Internal(anyhow::anyhow!(
            "no free lobby code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    async fn view(&self, lobby_code: &str) -> Result<LobbyView, ApiError> {
        self.lobbies
            .lobby_view(lobby_code)
            .await?
            .ok_or_else(|| ApiError::not_found("lobby"))
    }

    async fn open_owned_lobby(
        &self,
        username: &str,
        name: &str,
        image_name: String,
    ) -> Result<String, ApiError> {
        let lobby_code = self.unused_lobby_code().await?;
        self.lobbies
            .create_lobby(
                &lobby_code,
                name,
                NewPlayer {
                    name: username.to_string(),
                    image_name,
                    is_owner: true,
                    has_account: true,
                },
            )
            .await?;
        Ok(lobby_code)
    }

    /// Opens a lobby owned by `username`, who joins it as its first player.
    pub async fn create_lobby(&self, username: &str, name: &str) -> Result<CreateLobbyResponse, ApiError> {
        validate_lobby_name(name)?;
        let account = self
            .accounts
            .find(username)
            .await?
            .ok_or_else(|| ApiError::not_found("account"))?;
        if self.lobbies.owned_lobby(username).await?.is_some()
            || !self.accounts.claim_ownership(username).await?
        {
            return Err(AuthError::AlreadyOwner.into());
        }

        let created = self.open_owned_lobby(username, name, account.image_name).await;
        let lobby_code = match created {
            Ok(lobby_code) => lobby_code,
            Err(e) => {
                self.accounts.set_owner(username, false).await?;
                return Err(e);
            }
        };

        let token = self
            .auth_service
            .issue_player_token(&lobby_code, username, true, true)?;
        info!(lobby_code = %lobby_code, owner = username, "Lobby created");
        self.bus.publish_all(EventTag::LobbyCreated);

        Ok(CreateLobbyResponse {
            token,
            lobby: self.view(&lobby_code).await?,
        })
    }

    /// Joins a lobby, as the account behind `account_token` if one is given and valid.
    pub async fn join_lobby(
        &self,
        request: JoinLobbyRequest,
        account_token: Option<&str>,
    ) -> Result<JoinLobbyResponse, ApiError> {
        let JoinLobbyRequest {
            player_name,
            lobby_code,
        } = request;
        validate_name("player name", &player_name)?;
        if !self.lobbies.code_exists(&lobby_code).await? {
            return Err(ApiError::not_found("lobby"));
        }

        let account = match account_token.map(|token| self.auth_service.validate_account_token(token)) {
            Some(Ok(claims)) => {
                if claims.username != player_name {
                    return Err(AuthError::ClaimMismatch.into());
                }
                self.accounts.find(&claims.username).await?
            }
            Some(Err(e)) => {
                warn!(lobby_code = %lobby_code, "Joining anonymously, account token rejected: {}", e);
                None
            }
            None => None,
        };

        let (image_name, has_account) = match account {
            Some(account) => (account.image_name, true),
            None => {
                let images = self.images.list().await?;
                let image = default_image(&player_name, &images).unwrap_or_default();
                (image.to_string(), false)
            }
        };

        let joined = self
            .lobbies
            .add_player(
                &lobby_code,
                NewPlayer {
                    name: player_name.clone(),
                    image_name,
                    is_owner: false,
                    has_account,
                },
            )
            .await?;
        if !joined {
            return Err(ApiError::Conflict(format!(
                "player name {player_name:?} is already taken in this lobby"
            )));
        }

        let token = self
            .auth_service
            .issue_player_token(&lobby_code, &player_name, has_account, false)?;
        info!(lobby_code = %lobby_code, player = %player_name, has_account, "Player joined");
        self.bus.publish_all(EventTag::PlayerJoined);

        Ok(JoinLobbyResponse {
            token,
            lobby: self.view(&lobby_code).await?,
        })
    }

    /// An owner leaving tears the whole lobby down.
    pub async fn leave_lobby(&self, lobby_code: &str, player_name: &str) -> Result<(), ApiError> {
        let player = self
            .lobbies
            .find_player(lobby_code, player_name)
            .await?
            .ok_or_else(|| ApiError::not_found("player"))?;

        if player.is_owner {
            self.tear_down(lobby_code, player_name, player.has_account)
                .await
        } else {
            self.lobbies.remove_player(lobby_code, player_name).await?;
            self.registry().remove_player(lobby_code, player_name);
            info!(lobby_code, player = player_name, "Player left");
            self.bus.publish_all(EventTag::PlayerLeft);
            Ok(())
        }
    }

    async fn tear_down(&self, lobby_code: &str, owner: &str, has_account: bool) -> Result<(), ApiError> {
        if let Some(game) = self.registry().remove_game(lobby_code) {
            game.lock().await.stop_timer();
            self.bus
                .publish(Broadcast::lobby(lobby_code, EventTag::GameDeleted));
        }

        self.lobbies.delete_lobby(lobby_code).await?;
        if has_account {
            self.accounts.set_owner(owner, false).await?;
        }
        self.registry().drop_lobby(lobby_code);

        info!(lobby_code, owner, "Lobby deleted");
        self.bus.publish_all(EventTag::LobbyDeleted);
        Ok(())
    }

    /// Tells the lobby about the owner's pick; nothing is stored until the game starts.
    pub async fn edit_game_mode(&self, lobby_code: &str, request: EditLobbyRequest) -> Result<(), ApiError> {
        if !self.lobbies.code_exists(lobby_code).await? {
            return Err(ApiError::not_found("lobby"));
        }
        if let Some(duration) = request.duration {
            validate_duration(duration)?;
        }

        self.bus.publish(Broadcast::mode_change(
            lobby_code,
            request.game_mode,
            request.duration,
        ));
        Ok(())
    }

    pub async fn get_lobby(&self, lobby_code: &str) -> Result<LobbyView, ApiError> {
        self.view(lobby_code).await
    }

    pub async fn list_lobbies(&self) -> Result<Vec<LobbiesView>, ApiError> {
        Ok(self.lobbies.list_lobbies().await?)
    }

    pub async fn owned_lobby(&self, username: &str) -> Result<Option<String>, ApiError> {
        Ok(self.lobbies.owned_lobby(username).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobby_codes_are_alphanumeric() {
        for _ in 0..50 {
            let code = random_lobby_code();
            assert_eq!(code.len(), LOBBY_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
