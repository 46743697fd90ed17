use lopdf::{Document, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::{page_resources, resource_entry, AnalysisError, Detection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontDetection {
    pub has_fonts: bool,
    pub font_count: u32,
    pub detection: Detection,
}

/// 统计所有页面引用的字体资源名
///
/// 资源结构无法解析时，只要提取到了文本就认为至少有一个字体
pub fn detect(doc: &Document, pages: &BTreeMap<u32, ObjectId>, text: &str) -> FontDetection {
    match collect_font_names(doc, pages) {
        Ok(names) => FontDetection {
            has_fonts: !names.is_empty(),
            font_count: names.len() as u32,
            detection: if names.is_empty() { Detection::Unknown } else { Detection::Confirmed },
        },
        Err(e) => {
            debug!("字体资源解析失败: {}", e);
            if text.is_empty() {
                FontDetection { has_fonts: false, font_count: 0, detection: Detection::Unknown }
            } else {
                FontDetection { has_fonts: true, font_count: 1, detection: Detection::Heuristic }
            }
        }
    }
}

fn collect_font_names(
    doc: &Document,
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<BTreeSet<Vec<u8>>, AnalysisError> {
    let mut fonts = BTreeSet::new();

    for page_id in pages.values() {
        let Some(resources) = page_resources(doc, *page_id)? else {
            continue;
        };
        if let Some(font_dict) = resource_entry(doc, resources, b"Font")? {
            fonts.extend(font_dict.iter().map(|(name, _)| name.clone()));
        }
    }

    Ok(fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::fixtures::PdfBuilder;
    use lopdf::{dictionary, Object};

    fn detect_bytes(bytes: &[u8], text: &str) -> FontDetection {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        detect(&doc, &pages, text)
    }

    #[test]
    fn shared_font_names_are_counted_once() {
        let bytes = PdfBuilder::new().text_page("one").text_page("two").build();
        let fonts = detect_bytes(&bytes, "onetwo");
        assert_eq!(
            fonts,
            FontDetection { has_fonts: true, font_count: 1, detection: Detection::Confirmed }
        );
    }

    #[test]
    fn pages_without_font_resources_report_none() {
        let bytes = PdfBuilder::new().without_fonts().raw_page("0 0 1 1 re f").build();
        let fonts = detect_bytes(&bytes, "");
        assert!(!fonts.has_fonts);
        assert_eq!(fonts.font_count, 0);
    }

    #[test]
    fn broken_font_resource_falls_back_to_text_evidence() {
        let bytes = PdfBuilder::new().text_page("text").build();
        let mut doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        let page_id = *pages.values().next().unwrap();
        // Font entry points at a non-dictionary object
        let bogus = doc.add_object(Object::Integer(7));
        let resources = dictionary! { "Font" => bogus };
        doc.get_dictionary_mut(page_id).unwrap().set("Resources", resources);

        let with_text = detect(&doc, &pages, "text");
        assert_eq!(
            with_text,
            FontDetection { has_fonts: true, font_count: 1, detection: Detection::Heuristic }
        );

        let without_text = detect(&doc, &pages, "");
        assert!(!without_text.has_fonts);
        assert_eq!(without_text.font_count, 0);
    }
}
