use std::path::PathBuf;

pub const INVOICE_SUFFIX: &str = "_Invoice.pdf";
pub const SUMMARY_SUFFIX: &str = "_Summary.pdf";
pub const PACKET_SUFFIX: &str = "_InvoicePacket.pdf";

/// 没有下划线时使用的账期描述
pub const DEFAULT_PERIOD_LABEL: &str = "this period";

/// 发票 + 汇总 文件对 (按命名规则匹配)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePair {
    /// 例如 "Acme_March"
    pub base_name: String,
    pub client_name: String,
    pub period_label: String,
    pub invoice_path: PathBuf,
    pub summary_path: PathBuf,
}

impl InvoicePair {
    pub fn new(base_name: impl Into<String>, invoice_path: PathBuf, summary_path: PathBuf) -> Self {
        let base_name = base_name.into();
        let (client_name, period_label) = split_base_name(&base_name);
        Self {
            client_name,
            period_label,
            base_name,
            invoice_path,
            summary_path,
        }
    }

    /// 合并后文件名: <Base>_InvoicePacket.pdf
    pub fn packet_file_name(&self) -> String {
        format!("{}{}", self.base_name, PACKET_SUFFIX)
    }
}

/// 扫描结果: 成对, 或缺少汇总文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovered {
    Paired(InvoicePair),
    MissingSummary { base_name: String, invoice_path: PathBuf },
}

/// "Acme_March_2024" -> ("Acme", "March")
/// 客户名取第一个下划线之前, 账期取第一、二个下划线之间
fn split_base_name(base_name: &str) -> (String, String) {
    let mut parts = base_name.split('_');
    let client = parts.next().unwrap_or_default().to_string();
    let period = parts
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_PERIOD_LABEL.to_string());
    (client, period)
}
