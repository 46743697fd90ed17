use regex::Regex;

/// 文本中的字符类别统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharCounts {
    pub chinese: usize,
    pub special: usize,
}

/// 按Unicode字符类别统计中文字符和特殊字符
pub struct CharClassifier {
    chinese: Regex,
    special: Regex,
}

impl CharClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // CJK统一表意文字基本区
            chinese: Regex::new(r"[\x{4E00}-\x{9FFF}]")?,
            // 非单词字符、非空白、非中文
            special: Regex::new(r"[^\w\s\x{4E00}-\x{9FFF}]")?,
        })
    }

    pub fn count(&self, text: &str) -> CharCounts {
        CharCounts {
            chinese: self.chinese.find_iter(text).count(),
            special: self.special.find_iter(text).count(),
        }
    }
}
