#![allow(dead_code)]

use invoice_packet_dispatcher::service::{DeliveryError, Mailer, OutgoingMail};
use invoice_packet_dispatcher::AppConfig;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// 临时工作目录: InvoicesToProcess / FinalInvoices / 联系人 / 日志
pub struct Workspace {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl Workspace {
    pub fn new(contacts_csv: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = AppConfig::default();
        config.paths.invoice_dir = dir.path().join("InvoicesToProcess");
        config.paths.output_dir = dir.path().join("FinalInvoices");
        config.paths.contacts_file = dir.path().join("client_contacts.csv");
        config.paths.log_file = dir.path().join("invoice_log.csv");
        config.paths.env_file = dir.path().join(".env");

        std::fs::create_dir(&config.paths.invoice_dir).expect("create invoice dir");
        std::fs::write(&config.paths.contacts_file, contacts_csv).expect("write contacts");
        Self { dir, config }
    }

    pub fn add_pdf(&self, name: &str, labels: &[&str]) -> PathBuf {
        let path = self.config.paths.invoice_dir.join(name);
        labelled_document(labels).save(&path).expect("save pdf");
        path
    }

    pub fn add_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.config.paths.invoice_dir.join(name);
        std::fs::write(&path, bytes).expect("write file");
        path
    }

    pub fn packet_path(&self, name: &str) -> PathBuf {
        self.config.paths.output_dir.join(name)
    }

    pub fn log_rows(&self) -> Vec<Vec<String>> {
        read_rows(&self.config.paths.log_file)
    }
}

/// 日志全部行 (含表头)
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("open log");
    reader
        .records()
        .map(|r| r.expect("log row").iter().map(str::to_string).collect())
        .collect()
}

/// 每页一个文本标记的 PDF
pub fn labelled_document(labels: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for label in labels {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(18)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(*label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// 按页顺序返回各页内容流文本
pub fn page_contents(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("load packet");
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).expect("page content")).into_owned())
        .collect()
}

/// 只记录发送请求, 不连网
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

impl Mailer for &RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        self.sent.lock().expect("mailer lock").push(mail.clone());
        Ok(())
    }
}
