use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::auth::{hash_password, AuthError};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{Order, Product, Role, User, UserCreate, UserPatch};
use crate::user_actor::UserError;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Starts one actor for `T` with ids counting up from 1.
fn spawn_actor<T>(buffer_size: usize) -> (ResourceClient<T>, JoinHandle<()>)
where
    T: Entity<Id = u64>,
{
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || counter.fetch_add(1, Ordering::SeqCst);

    let (actor, client) = ResourceActor::<T>::new(buffer_size, next_id);
    (client, tokio::spawn(actor.run()))
}

/// The storefront's actor system.
///
/// Starts the user, product and order actors, wires the sub-actor clients
/// into the order client, and joins every task on shutdown.
pub struct StoreSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    /// Create and start the entire actor system
    #[instrument(name = "store_system")]
    pub fn new(buffer_size: usize) -> Self {
        info!("Starting store system");

        let (users, user_handle) = spawn_actor::<User>(buffer_size);
        let user_client = UserClient::new(users);

        let (products, product_handle) = spawn_actor::<Product>(buffer_size);
        let product_client = ProductClient::new(products);

        let (orders, order_handle) = spawn_actor::<Order>(buffer_size);
        let order_client = OrderClient::new(orders, user_client.clone(), product_client.clone());

        info!("Store system started successfully");

        Self {
            order_client,
            user_client,
            product_client,
            handles: vec![user_handle, product_handle, order_handle],
        }
    }

    /// Makes sure an administrator with `email` exists: creates the account
    /// or promotes the existing one.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User, SeedError> {
        if let Some(user) = self.user_client.find_by_email(email).await? {
            if user.is_admin() {
                info!(user_id = user.id, "Admin account present");
                return Ok(user);
            }
            info!(user_id = user.id, "Promoting existing account to admin");
            let patch = UserPatch {
                role: Some(Role::Admin),
                ..Default::default()
            };
            return Ok(self.user_client.update_user(user.id, patch).await?);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let user = self
            .user_client
            .create_user(UserCreate {
                username: "Administrator".to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::Admin,
            })
            .await?;

        info!(user_id = user.id, "Admin account created");
        Ok(user)
    }

    /// Gracefully shutdown the entire actor system
    ///
    /// Dropping the last clients closes every mailbox; each actor then
    /// drains and exits. Clients cloned elsewhere (e.g. into the HTTP
    /// router) must be dropped first.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down store system");

        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Store system shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    #[tokio::test]
    async fn test_ensure_admin_creates_then_reuses() -> Result<(), Box<dyn std::error::Error>> {
        let system = StoreSystem::new(10);

        let admin = system.ensure_admin("Root@Store.test", "hunter22").await?;
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("hunter22", &admin.password_hash)?);

        let again = system.ensure_admin("root@store.test", "ignored").await?;
        assert_eq!(again.id, admin.id);
        assert_eq!(system.user_client.list_users().await?.len(), 1);

        system.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing_user() -> Result<(), Box<dyn std::error::Error>> {
        let system = StoreSystem::new(10);
        let user = system
            .user_client
            .create_user(UserCreate {
                username: "Shop Owner".into(),
                email: "owner@store.test".into(),
                password_hash: "hash".into(),
                role: Role::User,
            })
            .await?;

        let admin = system.ensure_admin("owner@store.test", "unused").await?;
        assert_eq!(admin.id, user.id);
        assert!(admin.is_admin());
        assert_eq!(admin.username, "Shop Owner");

        system.shutdown().await?;
        Ok(())
    }
}
