pub mod cli;
pub mod config;
pub mod models;
pub mod service;
pub mod store;

pub use config::{AppConfig, Credentials};
pub use models::{ContactDirectory, DeliveryStatus, InvoicePair, LogEntry, RunReport};
pub use service::{DeliveryMode, Dispatcher, SmtpMailer};
pub use store::load_contacts;
