pub mod common;
pub mod health;
pub mod receiving;

use std::sync::Arc;
use std::time::Duration;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub receiving: Arc<services::receiving::ReceivingService>,
    pub edit_locks: Arc<services::edit_locks::EditLockService>,
    pub inventory_sync: Arc<services::inventory_sync::InventorySyncService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        pos_endpoint: Option<String>,
        receive_lock_wait: Duration,
    ) -> Self {
        let inventory_sync = Arc::new(services::inventory_sync::InventorySyncService::new(
            pos_endpoint,
            Some(event_sender.clone()),
        ));
        let receiving = Arc::new(
            services::receiving::ReceivingService::new(
                db_pool.clone(),
                inventory_sync.clone(),
                Some(event_sender.clone()),
            )
            .with_lock_wait(receive_lock_wait),
        );
        let edit_locks = Arc::new(services::edit_locks::EditLockService::new(
            db_pool,
            Some(event_sender),
        ));

        Self {
            receiving,
            edit_locks,
            inventory_sync,
        }
    }
}
