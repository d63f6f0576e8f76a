use crate::ports::BlacklistStore;
use autoguard_domain::DomainError;
use std::sync::Arc;
use tracing::{error, info};

/// Reread blacklist rows from the primary store and atomically replace the
/// shared-cache projection. Invoked by the dashboard after entry writes and
/// available as an admin endpoint.
pub struct RebuildBlacklistUseCase {
    store: Arc<dyn BlacklistStore>,
}

impl RebuildBlacklistUseCase {
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<(), DomainError> {
        info!("Blacklist cache rebuild started");
        self.store.rebuild_cache().await.map_err(|e| {
            error!(error = %e, "Blacklist cache rebuild failed");
            e
        })?;
        info!("Blacklist cache rebuild completed");
        Ok(())
    }
}
