//! arXiv 标识符工具

use regex::Regex;
use std::sync::OnceLock;

fn new_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?$").expect("valid regex"))
}

fn old_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z\-]*(\.[A-Z]{2})?/\d{7}(v\d+)?$").expect("valid regex")
    })
}

/// 是否为合法的 arXiv 标识符（新格式 `2301.07041` 或旧格式 `math.AG/0601001`）
pub fn is_well_formed(id: &str) -> bool {
    new_style().is_match(id) || old_style().is_match(id)
}
