pub mod claim;
pub mod claim_line;
pub mod discrepancy_case;
pub mod inventory_level;
pub mod inventory_movement;
pub mod shipment;
pub mod shipment_line;
pub mod shipment_lock;
