use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::io::Read as IoRead;
use tracing::debug;

use super::{page_resources, resource_entry, Detection};

/// 填充、描边、着色和绘制XObject的内容流操作符
const DRAWING_OPERATORS: &[&str] = &[
    "Do", "re", "f", "F", "f*", "S", "s", "B", "B*", "b", "b*", "sh", "BI",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDetection {
    pub has_images: bool,
    pub detection: Detection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XObjectKind {
    Image,
    Form,
}

/// 检测文档是否包含图形内容
///
/// 依次尝试:
/// 1. 页面资源中的 Image XObject (确认)
/// 2. 页面资源中的 Form XObject，可能嵌套图形 (推断)
/// 3. 页面内容流中的绘图操作符 (推断)
pub fn detect(doc: &Document, pages: &BTreeMap<u32, ObjectId>) -> ImageDetection {
    let mut form_seen = false;

    for (page_num, page_id) in pages {
        let kinds = page_xobject_kinds(doc, *page_id);
        if kinds.contains(&XObjectKind::Image) {
            debug!("第 {} 页发现 Image XObject", page_num);
            return ImageDetection { has_images: true, detection: Detection::Confirmed };
        }
        form_seen |= kinds.contains(&XObjectKind::Form);
    }

    if form_seen {
        return ImageDetection { has_images: true, detection: Detection::Heuristic };
    }

    for (page_num, page_id) in pages {
        if page_draws_graphics(doc, *page_id) {
            debug!("第 {} 页内容流包含绘图操作符", page_num);
            return ImageDetection { has_images: true, detection: Detection::Heuristic };
        }
    }

    ImageDetection { has_images: false, detection: Detection::Unknown }
}

fn page_xobject_kinds(doc: &Document, page_id: ObjectId) -> Vec<XObjectKind> {
    let xobjects = match page_resources(doc, page_id) {
        Ok(Some(resources)) => match resource_entry(doc, resources, b"XObject") {
            Ok(Some(dict)) => dict,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut kinds = Vec::new();
    for (_, val) in xobjects.iter() {
        let stream = match doc.dereference(val).and_then(|(_, obj)| obj.as_stream()) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let subtype = stream.dict.get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            .and_then(|n| std::str::from_utf8(n).ok());

        match subtype {
            Some("Image") => kinds.push(XObjectKind::Image),
            Some("Form") => kinds.push(XObjectKind::Form),
            _ => {}
        }
    }
    kinds
}

fn page_draws_graphics(doc: &Document, page_id: ObjectId) -> bool {
    let data = page_content_bytes(doc, page_id);
    if data.is_empty() {
        return false;
    }

    match Content::decode(&data) {
        Ok(content) => content
            .operations
            .iter()
            .any(|op| DRAWING_OPERATORS.contains(&op.operator.as_str())),
        Err(e) => {
            debug!("内容流解码失败，改用词法扫描: {}", e);
            scan_operator_tokens(&data)
        }
    }
}

/// 拼接页面的全部内容流 (解压失败时依次尝试 flate2 与原始数据)
fn page_content_bytes(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let Ok(contents) = page.get(b"Contents") else {
        return Vec::new();
    };

    let refs: Vec<&Object> = match doc.dereference(contents) {
        Ok((_, Object::Array(items))) => items.iter().collect(),
        Ok((_, obj)) => vec![obj],
        Err(_) => return Vec::new(),
    };

    let mut data = Vec::new();
    for item in refs {
        let stream = match doc.dereference(item).and_then(|(_, obj)| obj.as_stream()) {
            Ok(s) => s,
            Err(_) => continue,
        };
        let bytes = match stream.decompressed_content() {
            Ok(d) => d,
            Err(_) if stream.dict.has(b"Filter") => {
                manual_inflate(&stream.content).unwrap_or_else(|| stream.content.clone())
            }
            Err(_) => stream.content.clone(),
        };
        data.extend_from_slice(&bytes);
        data.push(b'\n');
    }
    data
}

/// 手动使用 flate2 解压数据（lopdf 的 decompressed_content 有时会失败）
fn manual_inflate(compressed: &[u8]) -> Option<Vec<u8>> {
    // Try zlib (with header) first
    let mut decoder = flate2::read::ZlibDecoder::new(compressed);
    let mut result = Vec::new();
    if decoder.read_to_end(&mut result).is_ok() {
        return Some(result);
    }

    // Fall back to raw deflate (no header)
    let mut decoder = flate2::read::DeflateDecoder::new(compressed);
    result.clear();
    decoder.read_to_end(&mut result).ok()?;
    Some(result)
}

fn scan_operator_tokens(data: &[u8]) -> bool {
    data.split(|b| b.is_ascii_whitespace() || b"[]()<>/{}".contains(b))
        .filter(|token| !token.is_empty())
        .filter_map(|token| std::str::from_utf8(token).ok())
        .any(|token| DRAWING_OPERATORS.contains(&token))
}
