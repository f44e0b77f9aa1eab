pub mod contacts;
pub mod run_log;

pub use contacts::{load_contacts, ContactsError};
pub use run_log::{LogWriteError, RunLog};
