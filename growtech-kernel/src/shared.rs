//! Process-wide slot for the generation client.
//!
//! The server installs one client at start-up; tests swap in a client backed
//! by a fake model and tear it down again afterwards.

use std::sync::{Arc, PoisonError, RwLock};

use crate::client::GenerationClient;

static SHARED: RwLock<Option<Arc<GenerationClient>>> = RwLock::new(None);

/// Installs `client` as the shared instance, returning the previous one.
pub fn install(client: Arc<GenerationClient>) -> Option<Arc<GenerationClient>> {
    SHARED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(client)
}

/// Returns the shared client, if one is installed.
#[must_use]
pub fn client() -> Option<Arc<GenerationClient>> {
    SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
}

/// Returns the shared client, installing the one built by `init` if the slot
/// is empty. `init` runs at most once even when called from several threads.
pub fn get_or_install_with<F>(init: F) -> Arc<GenerationClient>
where
    F: FnOnce() -> Arc<GenerationClient>,
{
    if let Some(existing) = client() {
        return existing;
    }

    let mut slot = SHARED.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(init))
}

/// Removes and returns the shared client.
pub fn teardown() -> Option<Arc<GenerationClient>> {
    SHARED.write().unwrap_or_else(PoisonError::into_inner).take()
}

/// Where a controller finds its generation client.
#[derive(Clone, Debug)]
pub enum ClientHandle {
    /// A client owned by the caller.
    Owned(Arc<GenerationClient>),
    /// Whatever client is installed in the shared slot at call time.
    Shared,
}

impl ClientHandle {
    /// Returns the client to use right now.
    #[must_use]
    pub fn resolve(&self) -> Option<Arc<GenerationClient>> {
        match self {
            Self::Owned(client) => Some(Arc::clone(client)),
            Self::Shared => client(),
        }
    }
}

impl From<Arc<GenerationClient>> for ClientHandle {
    fn from(client: Arc<GenerationClient>) -> Self {
        Self::Owned(client)
    }
}
