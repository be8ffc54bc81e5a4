//! 基于编辑距离的相似度

use strsim::levenshtein;

use crate::matcher::normalize::normalize;

/// 计算两个字符串归一化后的相似度
///
/// 返回值范围 [0.0, 1.0]，1.0 表示归一化后完全相同。
/// 相似度 = 1 - distance / max_len，长度按字符计数（非字节）
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    // 归一化后相等直接判 1.0（含双方皆为空）
    if a == b {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(&a, &b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        for s in ["", "bonjour", "Je m'appelle Marie", "   "] {
            assert_eq!(similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_accent_and_punctuation_insensitive() {
        assert_eq!(similarity("café", "cafe"), 1.0);
        assert_eq!(similarity("Bonjour!", "bonjour"), 1.0);
    }

    #[test]
    fn test_known_distances() {
        // bonjour → bonjur：删除 1 个字符，7 个字符中差 1
        let s = similarity("bonjour", "bonjur");
        assert!((s - 6.0 / 7.0).abs() < 1e-12);

        // bonsoir vs bonjour：替换 2 个字符
        let s = similarity("Bonsoir", "Bonjour");
        assert!((s - 5.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_side_empty() {
        assert_eq!(similarity("", "bonjour"), 0.0);
        assert_eq!(similarity("?!", "merci"), 0.0);
    }

    #[test]
    fn test_symmetric_and_in_range() {
        let pairs = [
            ("bonjour", "au revoir"),
            ("merci beaucoup", "merci bocoup"),
            ("", "salut"),
            ("Où est la gare ?", "ou et la guerre"),
            ("日本語", "にほんご"),
        ];
        for (a, b) in pairs {
            let ab = similarity(a, b);
            let ba = similarity(b, a);
            assert_eq!(ab, ba, "{:?} vs {:?}", a, b);
            assert!((0.0..=1.0).contains(&ab), "{:?} vs {:?} = {}", a, b, ab);
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 非拉丁字符不能按 UTF-8 字节数计算长度
        let s = similarity("日本", "日本語");
        assert!((s - 2.0 / 3.0).abs() < 1e-12);
    }
}
