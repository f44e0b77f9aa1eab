use crate::models::ContactDirectory;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactsError {
    #[error("failed to read contacts file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 联系人 CSV 行 (ClientName,Email), 多余列忽略
#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(rename = "ClientName")]
    client_name: String,
    #[serde(rename = "Email")]
    email: String,
}

/// 读取联系人表. Email 为空的行视为没有联系人.
pub fn load_contacts(path: &Path) -> Result<ContactDirectory, ContactsError> {
    let to_err = |source| ContactsError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(to_err)?;

    let mut directory = ContactDirectory::new();
    for row in reader.deserialize::<ContactRow>() {
        let row = row.map_err(to_err)?;
        if row.email.is_empty() {
            tracing::debug!("contact row for {} has no email", row.client_name);
        } else {
            directory.insert(row.client_name, row.email);
        }
    }

    tracing::info!("Loaded {} contacts from {}", directory.len(), path.display());
    Ok(directory)
}
