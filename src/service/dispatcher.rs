use crate::config::AppConfig;
use crate::models::{ContactDirectory, DeliveryStatus, Discovered, InvoicePair, LogEntry, RunReport};
use crate::service::discovery::discover_pairs;
use crate::service::mailer::{Mailer, OutgoingMail};
use crate::service::packet::assemble_packet;
use crate::store::{LogWriteError, RunLog};
use std::path::PathBuf;
use thiserror::Error;

/// 终止整次运行的错误; 单个文件对的失败只写入日志
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("cannot scan invoice folder {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create output folder {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    LogWrite(#[from] LogWriteError),
}

/// 发送方式: 试运行不持有任何邮件通道
pub enum DeliveryMode<M> {
    DryRun,
    Live(M),
}

/// 发票包分发流程: 配对 -> 合并 -> 发送 -> 记录, 逐对顺序处理
pub struct Dispatcher<'a, M> {
    config: &'a AppConfig,
    contacts: &'a ContactDirectory,
    delivery: DeliveryMode<M>,
    log: RunLog,
}

impl<'a, M: Mailer> Dispatcher<'a, M> {
    pub fn new(config: &'a AppConfig, contacts: &'a ContactDirectory, delivery: DeliveryMode<M>) -> Self {
        Self {
            config,
            contacts,
            delivery,
            log: RunLog::new(&config.paths.log_file),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.delivery, DeliveryMode::DryRun)
    }

    /// 处理输入目录中的全部文件对
    pub async fn run(&self) -> Result<RunReport, DispatchError> {
        let paths = &self.config.paths;

        self.log.ensure_header()?;
        std::fs::create_dir_all(&paths.output_dir).map_err(|source| DispatchError::OutputDir {
            path: paths.output_dir.clone(),
            source,
        })?;

        let discovered = discover_pairs(&paths.invoice_dir).map_err(|source| DispatchError::Scan {
            path: paths.invoice_dir.clone(),
            source,
        })?;

        tracing::info!(
            "Found {} invoice file(s) in {} (dry run: {})",
            discovered.len(),
            paths.invoice_dir.display(),
            self.is_dry_run()
        );

        let mut report = RunReport::default();
        let total = discovered.len();

        for (idx, item) in discovered.into_iter().enumerate() {
            match item {
                Discovered::MissingSummary { base_name, .. } => {
                    tracing::warn!("Missing summary for: {}", base_name);
                    report.record_missing_summary();
                }
                Discovered::Paired(pair) => {
                    let entry = self.process_pair(&pair).await?;
                    tracing::info!(
                        "[{}/{}] {} -> {}",
                        idx + 1,
                        total,
                        entry.filename,
                        entry.status
                    );
                    report.record(entry);
                }
            }
        }

        tracing::info!(
            "Run finished: {} logged, {} sent, {} dry run, {} no contact, {} failed, {} missing summary",
            report.logged(),
            report.sent,
            report.dry_run,
            report.no_contact,
            report.failed,
            report.skipped_missing_summary
        );

        Ok(report)
    }

    /// 单个文件对. 只有日志写入失败会向上返回.
    async fn process_pair(&self, pair: &InvoicePair) -> Result<LogEntry, LogWriteError> {
        let status = self.assemble_and_deliver(pair).await;
        let entry = LogEntry::now(pair.client_name.clone(), pair.packet_file_name(), status);
        self.log.append(&entry)?;
        Ok(entry)
    }

    async fn assemble_and_deliver(&self, pair: &InvoicePair) -> DeliveryStatus {
        let packet = match assemble_packet(pair, &self.config.paths.output_dir) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::error!("Failed to assemble packet for {}: {}", pair.base_name, e);
                return DeliveryStatus::Failed(e.to_string());
            }
        };

        // 无联系人优先于试运行 / 实发判断
        let Some(email) = self.contacts.lookup(&pair.client_name) else {
            tracing::warn!("No email found for client {}", pair.client_name);
            return DeliveryStatus::NoContact;
        };

        let mailer = match &self.delivery {
            DeliveryMode::DryRun => {
                tracing::info!(
                    "[DRY RUN] Would send email to {} with file: {}",
                    email,
                    pair.packet_file_name()
                );
                return DeliveryStatus::DryRun;
            }
            DeliveryMode::Live(mailer) => mailer,
        };

        let mail = OutgoingMail::compose(pair, email, packet.path, &self.config.mail);
        match mailer.send(&mail).await {
            Ok(()) => {
                tracing::info!("Email sent to {}", email);
                DeliveryStatus::Sent
            }
            Err(e) => {
                tracing::error!("Error sending email to {}: {}", email, e);
                DeliveryStatus::Failed(e.to_string())
            }
        }
    }
}
