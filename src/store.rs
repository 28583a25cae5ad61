use std::{collections::HashMap, error::Error};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    auth::CredentialStore,
    types::{Credential, Username},
};

/// Process-local credential store, for tests and the demo server.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    storage: RwLock<HashMap<Username, Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_subject(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, Box<dyn Error + Send + Sync>> {
        Ok(self.storage.read().await.get(username).cloned())
    }

    async fn create_if_not_exists(
        &self,
        credential: Credential,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut storage = self.storage.write().await;

        if storage.contains_key(&credential.username) {
            return Ok(false);
        }

        storage.insert(credential.username.clone(), credential);
        Ok(true)
    }
}
