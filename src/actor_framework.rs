use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Ord + Copy + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + Clone + PartialEq + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Construct the full Entity from the ID and creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called against every stored entity before a new one is inserted.
    fn check_conflict(&self, _existing: &Self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;

    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Errors produced by the generic actor machinery. Domain failures travel
/// inside [`FrameworkError::Entity`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Entity(E),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

pub type FrameworkResult<T, E> = Result<T, FrameworkError<E>>;

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<FrameworkResult<T, E>>;

/// Predicate used by [`ResourceRequest::List`].
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send>;

type EntityError<T> = <T as Entity>::Error;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T, EntityError<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, EntityError<T>>,
    },
    List {
        filter: Option<Filter<T>>,
        respond_to: Response<Vec<T>, EntityError<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, EntityError<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, EntityError<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, EntityError<T>>,
    },
    /// All-or-nothing batch of actions. See [`ResourceActor::apply_transaction`].
    Transaction {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>, EntityError<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs until every client has been dropped.
    #[instrument(name = "resource_actor", skip(self), fields(entity = std::any::type_name::<T>()))]
    pub async fn run(mut self) {
        debug!("Actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = match filter {
                        Some(filter) => self.store.values().filter(|item| filter(item)).cloned().collect(),
                        None => self.store.values().cloned().collect(),
                    };
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action).map_err(FrameworkError::Entity),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Transaction { actions, respond_to } => {
                    let _ = respond_to.send(self.apply_transaction(actions));
                }
            }
        }

        debug!("Actor stopped");
    }

    fn create(&mut self, params: T::CreateParams) -> FrameworkResult<T, T::Error> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id, params).map_err(FrameworkError::Entity)?;
        for existing in self.store.values() {
            item.check_conflict(existing).map_err(FrameworkError::Entity)?;
        }
        item.on_create().map_err(FrameworkError::Entity)?;
        self.store.insert(item.id(), item.clone());
        Ok(item)
    }

    fn update(&mut self, id: T::Id, patch: T::Patch) -> FrameworkResult<T, T::Error> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        // Patch a copy so a rejected patch leaves the stored item untouched.
        let mut updated = item.clone();
        updated.on_update(patch).map_err(FrameworkError::Entity)?;
        *item = updated.clone();
        Ok(updated)
    }

    fn delete(&mut self, id: T::Id) -> FrameworkResult<T, T::Error> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Entity)?;
        self.store
            .remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    /// Applies `actions` in order against staged copies. Any failure drops
    /// the staging area so the store is left exactly as it was; success
    /// writes every staged copy back in one step.
    fn apply_transaction(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> FrameworkResult<Vec<T::ActionResult>, T::Error> {
        let mut staged: BTreeMap<T::Id, T> = BTreeMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let item = match staged.entry(id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let Some(current) = self.store.get(&id) else {
                        warn!(%id, "Transaction rolled back: item not found");
                        return Err(FrameworkError::NotFound(id.to_string()));
                    };
                    entry.insert(current.clone())
                }
            };

            match item.handle_action(action) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(%id, error = %e, "Transaction rolled back");
                    return Err(FrameworkError::Entity(e));
                }
            }
        }

        debug!(touched = staged.len(), "Transaction committed");
        self.store.extend(staged);
        Ok(results)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> FrameworkResult<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> FrameworkResult<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> FrameworkResult<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self, filter: Option<Filter<T>>) -> FrameworkResult<Vec<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::List { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> FrameworkResult<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> FrameworkResult<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    /// Single action outside a transaction. Clients batch through
    /// [`ResourceClient::transact`] instead.
    #[allow(dead_code)]
    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> FrameworkResult<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn transact(
        &self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> FrameworkResult<Vec<T::ActionResult>, T::Error> {
        self.request(|respond_to| ResourceRequest::Transaction { actions, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
