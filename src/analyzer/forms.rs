use lopdf::{Document, Object};
use tracing::debug;

use super::AnalysisError;

const MAX_FIELD_DEPTH: usize = 16;

/// 统计交互式表单 (AcroForm) 中的终端字段数量，缺失或解析失败时为 0
pub fn count_fields(doc: &Document) -> u32 {
    match try_count_fields(doc) {
        Ok(count) => count,
        Err(e) => {
            debug!("表单字段统计失败: {}", e);
            0
        }
    }
}

fn try_count_fields(doc: &Document) -> Result<u32, AnalysisError> {
    let (_, catalog) = doc.dereference(doc.trailer.get(b"Root")?)?;
    let catalog = catalog.as_dict()?;

    let Ok(acroform) = catalog.get(b"AcroForm") else {
        return Ok(0);
    };
    let (_, acroform) = doc.dereference(acroform)?;
    let Ok(fields) = acroform.as_dict()?.get(b"Fields") else {
        return Ok(0);
    };
    let (_, fields) = doc.dereference(fields)?;

    Ok(fields
        .as_array()?
        .iter()
        .map(|field| count_terminal_fields(doc, field, 0))
        .sum())
}

/// Kids 中带 /T 的是子字段，否则只是该字段的控件注释
fn count_terminal_fields(doc: &Document, field: &Object, depth: usize) -> u32 {
    if depth > MAX_FIELD_DEPTH {
        return 0;
    }
    let Ok(dict) = doc.dereference(field).and_then(|(_, obj)| obj.as_dict()) else {
        return 0;
    };

    let child_fields: Vec<&Object> = match dict.get(b"Kids").and_then(Object::as_array) {
        Ok(kids) => kids
            .iter()
            .filter(|kid| {
                doc.dereference(kid)
                    .and_then(|(_, obj)| obj.as_dict())
                    .map(|d| d.has(b"T"))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    if child_fields.is_empty() {
        1
    } else {
        child_fields
            .into_iter()
            .map(|kid| count_terminal_fields(doc, kid, depth + 1))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::fixtures::PdfBuilder;
    use lopdf::dictionary;

    #[test]
    fn counts_top_level_fields() {
        let bytes = PdfBuilder::new().text_page("form").with_form_fields(4).build();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(count_fields(&doc), 4);
    }

    #[test]
    fn document_without_acroform_has_no_fields() {
        let bytes = PdfBuilder::new().text_page("plain").build();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(count_fields(&doc), 0);
    }

    #[test]
    fn nested_fields_count_only_terminals() {
        let bytes = PdfBuilder::new().text_page("nested").build();
        let mut doc = Document::load_mem(&bytes).unwrap();

        let child_a = doc.add_object(dictionary! { "T" => Object::string_literal("first"), "FT" => "Tx" });
        let child_b = doc.add_object(dictionary! { "T" => Object::string_literal("last"), "FT" => "Tx" });
        let widget = doc.add_object(dictionary! { "Subtype" => "Widget" });
        let parent = doc.add_object(dictionary! {
            "T" => Object::string_literal("name"),
            "Kids" => vec![child_a.into(), child_b.into()],
        });
        let checkbox = doc.add_object(dictionary! {
            "T" => Object::string_literal("agree"),
            "FT" => "Btn",
            "Kids" => vec![widget.into()],
        });

        let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_dictionary_mut(root_id).unwrap().set(
            "AcroForm",
            dictionary! { "Fields" => vec![parent.into(), checkbox.into()] },
        );

        assert_eq!(count_fields(&doc), 3);
    }
}
