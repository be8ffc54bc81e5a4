//! 文本归一化
//!
//! 让重音、大小写、标点上的差异不影响匹配

use unicode_normalization::UnicodeNormalization;

/// 组合附加符号区间（Combining Diacritical Marks）
const COMBINING_MARKS: std::ops::RangeInclusive<u32> = 0x0300..=0x036F;

/// 归一化文本
///
/// 小写 → NFD 分解 → 去掉 U+0300–U+036F → 去掉非单词/非空白字符 → 去首尾空白。
/// 中间的连续空白不折叠。
///
/// 纯函数，幂等：`normalize(normalize(s)) == normalize(s)`
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let stripped: String = lowered
        .nfd()
        .filter(|ch| !COMBINING_MARKS.contains(&(*ch as u32)))
        .filter(|ch| is_word_char(*ch) || ch.is_whitespace())
        .collect();

    stripped.trim().to_string()
}

/// 单词字符：字母、数字、下划线
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_french_accents() {
        assert_eq!(normalize("café"), "cafe");
        assert_eq!(normalize("Ça va, très bien"), "ca va tres bien");
        assert_eq!(normalize("à bientôt"), "a bientot");
        assert_eq!(normalize("Noël"), "noel");
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(normalize("Bonjour!"), "bonjour");
        assert_eq!(normalize("S'il vous plaît."), "sil vous plait");
        assert_eq!(normalize("« Qu'est-ce que c'est ? »"), "questce que cest");
    }

    #[test]
    fn test_trim_but_keep_inner_whitespace() {
        assert_eq!(normalize("  bonjour  "), "bonjour");
        // 标点被删后留下的双空格保持原样
        assert_eq!(normalize("oui , merci"), "oui  merci");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
        assert_eq!(normalize("?!..."), "");
    }

    #[test]
    fn test_keeps_digits_and_underscore() {
        assert_eq!(normalize("Il est 8h30_"), "il est 8h30_");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Je voudrais un café, s'il vous plaît",
            "  ÉCOLE  d'été !! ",
            "Œuvre, cœur",
            "İstanbul",
            "",
            "déjà-vu\u{00A0}encore",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {:?}", s);
        }
    }
}
