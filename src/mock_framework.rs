//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_transaction`] to assert behavior.

use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};

type Receiver<T> = mpsc::Receiver<ResourceRequest<T>>;
type Responder<R, T> = Response<R, <T as Entity>::Error>;

/// Creates a mock client and a receiver for asserting requests.
///
/// The test plays the actor: it reads each request off `receiver`, checks
/// it, and answers through the bundled responder.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, Receiver<T>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut Receiver<T>,
) -> Option<(T::CreateParams, Responder<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut Receiver<T>) -> Option<(T::Id, Responder<Option<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut Receiver<T>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Transaction request
pub async fn expect_transaction<T: Entity>(
    receiver: &mut Receiver<T>,
) -> Option<(Vec<(T::Id, T::Action)>, Responder<Vec<T::ActionResult>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Transaction { actions, respond_to }) => Some((actions, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::UserClient;
    use crate::domain::{Product, Role, User, UserCreate};
    use crate::product_actor::{ProductAction, ProductActionResult};

    #[tokio::test]
    async fn test_mock_client() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let create_task = tokio::spawn(async move {
            client
                .create_user(UserCreate {
                    username: "Test".to_string(),
                    email: "test@example.com".to_string(),
                    password_hash: "hash".to_string(),
                    role: Role::User,
                })
                .await
        });

        let (params, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(params.username, "Test");
        let user = User {
            id: 1,
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
            role: params.role,
        };
        responder.send(Ok(user.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(user));
    }

    #[tokio::test]
    async fn test_mock_action() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let action_task = tokio::spawn(async move { client.perform_action(3, ProductAction::Restock(4)).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, 3);
        assert_eq!(action, ProductAction::Restock(4));
        responder.send(Ok(ProductActionResult::Restocked(9))).unwrap();

        assert_eq!(action_task.await.unwrap(), Ok(ProductActionResult::Restocked(9)));
    }
}
