use super::UserError;
use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserPatch};

impl Entity for User {
    type Id = u64;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> u64 {
        self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// The e-mail is trimmed and lower-cased so lookups and the uniqueness
    /// check are case-insensitive.
    fn from_create_params(id: u64, params: UserCreate) -> Result<Self, UserError> {
        let email = params.email.trim().to_lowercase();
        let username = params.username.trim().to_string();

        if email.is_empty() {
            return Err(UserError::ValidationError("Email required".to_string()));
        }
        if username.is_empty() {
            return Err(UserError::ValidationError("Username required".to_string()));
        }
        if params.password_hash.is_empty() {
            return Err(UserError::ValidationError("Password required".to_string()));
        }

        Ok(Self {
            id,
            username,
            email,
            password_hash: params.password_hash,
            role: params.role,
        })
    }

    fn check_conflict(&self, existing: &User) -> Result<(), UserError> {
        if existing.email == self.email {
            return Err(UserError::AlreadyExists(self.email.clone()));
        }
        Ok(())
    }

    /// Updates the user's display name and/or role.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(username) = patch.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(UserError::ValidationError("Username required".to_string()));
            }
            self.username = username.to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
