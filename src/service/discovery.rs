use crate::models::invoice::{Discovered, InvoicePair, INVOICE_SUFFIX, SUMMARY_SUFFIX};
use std::io;
use std::path::Path;

/// 扫描目录中的 `<Base>_Invoice.pdf`, 为每个发票查找同名 `<Base>_Summary.pdf`.
///
/// 只扫描一层, 按文件名排序.
pub fn discover_pairs(invoice_dir: &Path) -> io::Result<Vec<Discovered>> {
    let mut invoice_names = Vec::new();
    for entry in std::fs::read_dir(invoice_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if name.ends_with(INVOICE_SUFFIX) && name.len() > INVOICE_SUFFIX.len() {
            invoice_names.push(name);
        }
    }
    invoice_names.sort();

    let discovered = invoice_names
        .into_iter()
        .map(|name| {
            let base_name = name[..name.len() - INVOICE_SUFFIX.len()].to_string();
            let invoice_path = invoice_dir.join(&name);
            let summary_path = invoice_dir.join(format!("{}{}", base_name, SUMMARY_SUFFIX));
            if summary_path.is_file() {
                Discovered::Paired(InvoicePair::new(base_name, invoice_path, summary_path))
            } else {
                Discovered::MissingSummary { base_name, invoice_path }
            }
        })
        .collect();

    Ok(discovered)
}
