use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// PDF文本提取：优先使用 pdf-extract，失败时逐页回退到 lopdf
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 按页序提取全部文本
    pub fn extract(&self, doc: &Document, bytes: &[u8]) -> String {
        match self.extract_with_pdf_extract(bytes) {
            Some(text) => text,
            None => self.extract_by_pages(doc),
        }
    }

    fn extract_with_pdf_extract(&self, bytes: &[u8]) -> Option<String> {
        // pdf-extract panics on some malformed font programs
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes)));

        match outcome {
            Ok(Ok(pages)) => Some(join_pages(&pages)),
            Ok(Err(e)) => {
                warn!("pdf-extract 提取失败，改用逐页提取: {}", e);
                None
            }
            Err(_) => {
                warn!("pdf-extract 异常退出，改用逐页提取");
                None
            }
        }
    }

    fn extract_by_pages(&self, doc: &Document) -> String {
        let mut text = String::new();

        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => debug!("第 {} 页文本提取失败: {}", page_number, e),
            }
        }

        text
    }
}

/// 拼接各页文本，去掉 pdf-extract 在每页开头插入的换行
fn join_pages(pages: &[String]) -> String {
    pages.iter().map(|page| page.trim_start_matches('\n')).collect()
}
