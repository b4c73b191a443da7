// ==========================================
// 商品目录迁移工具 - slug 派生
// ==========================================
// 职责: 从名称派生 URL slug（商品类型、商品、临时属性值）
// 对齐: 目标店面的 slug 规则 —— 小写、保留字母数字、
//       其余字符折叠为单个连字符、首尾不留连字符
// ==========================================

/// 从名称派生 slug
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Fuzz"), "fuzz");
        assert_eq!(slugify("Guitar Pedal"), "guitar-pedal");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(slugify("Big  Muff -- Pi"), "big-muff-pi");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("  9V  "), "9v");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_keeps_unicode_letters() {
        assert_eq!(slugify("Körösistraße"), "körösistraße");
    }
}
