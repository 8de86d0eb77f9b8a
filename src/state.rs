use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::config::AppConfig;
use crate::records::OwnedRecord;
use crate::services::{RecordService, ResourceService, UserService};
use crate::store::DocumentStore;

/// Shared handles for every request handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>, config: AppConfig) -> Self {
        Self {
            store,
            identity,
            config: Arc::new(config),
        }
    }

    pub fn records<R: OwnedRecord>(&self) -> RecordService<R> {
        RecordService::new(self.store.clone())
    }

    pub fn resources(&self) -> ResourceService {
        ResourceService::new(self.store.clone(), self.identity.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.identity.clone())
    }
}
