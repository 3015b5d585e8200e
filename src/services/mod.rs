pub mod claims;
pub mod edit_locks;
pub mod inventory_sync;
pub mod receiving;

pub use claims::{ClaimDelta, ClaimService};
pub use edit_locks::{EditLockService, LockGrant};
pub use inventory_sync::{InventorySyncService, PosLevelUpdate};
pub use receiving::{ReceiveOutcome, ReceiveShipmentCommand, ReceivingService};
