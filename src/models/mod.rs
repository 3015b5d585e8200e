pub mod discrepancy;
pub mod shipment_status;
pub mod submission;

pub use discrepancy::{classify, CaseDelta, DiscrepancyType};
pub use shipment_status::ShipmentStatus;
pub use submission::{QuantityField, ReceiveStats, SubmittedLine};
