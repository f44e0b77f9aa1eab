use crate::models::InvoicePair;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 页面可从父级 Pages 节点继承的属性
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 向上查找 Parent 的最大层数 (防止循环引用)
const MAX_PAGE_TREE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("cannot read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("{path} contains no pages")]
    NoPages { path: PathBuf },
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("cannot write {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// 合并结果
#[derive(Debug, Clone)]
pub struct AssembledPacket {
    pub path: PathBuf,
    pub page_count: usize,
}

/// 发票页在前, 汇总页在后, 写入 `<output_dir>/<Base>_InvoicePacket.pdf`.
/// 写入失败时不清理残留文件.
pub fn assemble_packet(pair: &InvoicePair, output_dir: &Path) -> Result<AssembledPacket, PacketError> {
    let invoice = load_document(&pair.invoice_path)?;
    let summary = load_document(&pair.summary_path)?;

    let mut merged = merge_documents(vec![invoice, summary])?;
    let page_count = merged.get_pages().len();

    let path = output_dir.join(pair.packet_file_name());
    merged.save(&path).map_err(|e| PacketError::Save {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    tracing::debug!("Wrote {} ({} pages)", path.display(), page_count);
    Ok(AssembledPacket { path, page_count })
}

fn load_document(path: &Path) -> Result<Document, PacketError> {
    let document = Document::load(path).map_err(|source| PacketError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    if document.get_pages().is_empty() {
        return Err(PacketError::NoPages {
            path: path.to_path_buf(),
        });
    }
    Ok(document)
}

/// 按传入顺序拼接所有文档的页面.
///
/// 各文档对象重新编号后原样拷贝 (内容流不重新编码), 所有页面挂到第一个
/// 文档的 Pages 根节点下, 目录使用第一个文档的 Catalog. 书签不保留.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document, PacketError> {
    let version = documents
        .first()
        .map(|d| d.version.clone())
        .ok_or_else(|| PacketError::Malformed("nothing to merge".to_string()))?;

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages 按页码排序, 保证原始页序
        for (_, page_id) in doc.get_pages() {
            let mut page = doc
                .get_dictionary(page_id)
                .map_err(|e| PacketError::Malformed(format!("page {:?}: {}", page_id, e)))?
                .clone();
            inherit_page_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version(version);
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut pages_root: Option<ObjectId> = None;

    for (id, object) in objects {
        let kind = object.type_name().map(str::to_string).unwrap_or_default();
        match kind.as_str() {
            "Catalog" => {
                if catalog.is_none() {
                    let dict = object
                        .as_dict()
                        .map_err(|e| PacketError::Malformed(format!("catalog: {}", e)))?;
                    catalog = Some((id, dict.clone()));
                }
            }
            "Pages" => {
                if pages_root.is_none() {
                    pages_root = Some(id);
                }
            }
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }

    let pages_root = pages_root.ok_or_else(|| PacketError::Malformed("no page tree".to_string()))?;
    let (catalog_id, mut catalog) = catalog.ok_or_else(|| PacketError::Malformed("no catalog".to_string()))?;

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let page_count = kids.len() as i64;
    for (id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_root));
        merged.objects.insert(id, Object::Dictionary(page));
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Pages".to_vec()));
    root.set("Kids", Object::Array(kids));
    root.set("Count", Object::Integer(page_count));
    merged.objects.insert(pages_root, Object::Dictionary(root));

    catalog.set("Pages", Object::Reference(pages_root));
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    merged.max_id = merged.objects.keys().map(|(num, _)| *num).max().unwrap_or(0);
    merged.renumber_objects();

    Ok(merged)
}

/// 把父节点上的可继承属性写到页面本身, 页面改挂新父节点后外观不变
fn inherit_page_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth >= MAX_PAGE_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_PAGE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
}
