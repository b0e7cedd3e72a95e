//! User service.

use polleneer_common::{AppError, AppResult};
use polleneer_db::{
    entities::{interaction::InteractionKind, user},
    repositories::{InteractionRepository, UserRepository},
};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    interaction_repo: InteractionRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, interaction_repo: InteractionRepository) -> Self {
        Self {
            user_repo,
            interaction_repo,
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Suggest users to follow: anyone the viewer does not already follow.
    pub async fn suggested(&self, viewer_id: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let following = self
            .interaction_repo
            .find_active_by_actor(viewer_id, &InteractionKind::Follow)
            .await?;
        let exclude: Vec<String> = following.into_iter().map(|f| f.target_id).collect();

        self.user_repo.find_others(viewer_id, &exclude, limit).await
    }
}
