//! User Command Handlers

use std::sync::Arc;

use crate::application::commands::RegisterUser;
use crate::application::error::ApplicationError;
use crate::application::ports::UserRepositoryPort;

/// RegisterUser Handler
pub struct RegisterUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl RegisterUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: RegisterUser) -> Result<(), ApplicationError> {
        self.user_repo.upsert(&command.profile).await?;

        tracing::info!(
            user_id = command.profile.user_id,
            username = ?command.profile.username,
            "User registered"
        );

        Ok(())
    }
}
