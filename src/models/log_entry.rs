use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

pub const LOG_HEADER: [&str; 4] = ["Timestamp", "ClientName", "Filename", "EmailStatus"];
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 发送结果, Display 即日志中的 EmailStatus 文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    DryRun,
    NoContact,
    Failed(String),
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Sent => f.write_str("Sent"),
            DeliveryStatus::DryRun => f.write_str("Dry run \u{2013} not sent"),
            DeliveryStatus::NoContact => f.write_str("No email found"),
            DeliveryStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

impl Serialize for DeliveryStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 发送日志的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub client_name: String,
    pub filename: String,
    pub status: DeliveryStatus,
}

impl LogEntry {
    pub fn now(client_name: impl Into<String>, filename: impl Into<String>, status: DeliveryStatus) -> Self {
        Self {
            timestamp: Local::now(),
            client_name: client_name.into(),
            filename: filename.into(),
            status,
        }
    }

    /// 按 LOG_HEADER 顺序输出的 CSV 字段
    pub fn to_record(&self) -> [String; 4] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.client_name.clone(),
            self.filename.clone(),
            self.status.to_string(),
        ]
    }
}

impl Serialize for LogEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("LogEntry", 4)?;
        s.serialize_field("timestamp", &self.timestamp.format(TIMESTAMP_FORMAT).to_string())?;
        s.serialize_field("client_name", &self.client_name)?;
        s.serialize_field("filename", &self.filename)?;
        s.serialize_field("status", &self.status)?;
        s.end()
    }
}
