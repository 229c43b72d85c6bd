use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::client::{ClientKey, ClientRole};

/// Read access to client roles owned by the auth layer.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Unknown clients are treated as players.
    async fn role(&self, client_key: &str) -> ClientRole;
}

#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<HashMap<ClientKey, ClientRole>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_role(&self, client_key: &str, role: ClientRole) {
        self.roles
            .write()
            .await
            .insert(client_key.to_string(), role);
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn role(&self, client_key: &str) -> ClientRole {
        self.roles
            .read()
            .await
            .get(client_key)
            .copied()
            .unwrap_or_default()
    }
}
