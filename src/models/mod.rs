pub mod contact;
pub mod invoice;
pub mod log_entry;
pub mod report;

pub use contact::ContactDirectory;
pub use invoice::{Discovered, InvoicePair};
pub use log_entry::{DeliveryStatus, LogEntry};
pub use report::RunReport;
