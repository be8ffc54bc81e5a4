//! 匹配主入口
//!
//! 组合归一化、相似度、阈值判定与分档反馈

use crate::matcher::similarity::similarity;
use crate::matcher::types::{FeedbackTier, MatchResult};

/// 默认通过阈值
///
/// 未经人工标注校准的经验值，按配置常量对待
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.7;

/// 发音匹配器（无状态，仅持有通过阈值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatcher {
    acceptance_threshold: f64,
}

impl TextMatcher {
    /// 创建匹配器
    ///
    /// # Arguments
    /// * `acceptance_threshold` - 相似度不低于该值即视为通过
    pub fn new(acceptance_threshold: f64) -> Self {
        Self {
            acceptance_threshold,
        }
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    /// 阈值判定
    pub fn is_acceptable(&self, similarity: f64) -> bool {
        similarity >= self.acceptance_threshold
    }

    /// 比较转写文本与目标短语
    ///
    /// 任意输入（含空串）都会返回结果，不会失败
    ///
    /// # Arguments
    /// * `spoken` - STT 转写文本
    /// * `target` - 目标短语
    pub fn compare(&self, spoken: &str, target: &str) -> MatchResult {
        let similarity = similarity(spoken, target);
        let tier = FeedbackTier::classify(similarity);

        MatchResult {
            similarity,
            is_acceptable: self.is_acceptable(similarity),
            suggestions: vec![tier.message().to_string()],
        }
    }
}

impl Default for TextMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPTANCE_THRESHOLD)
    }
}

/// 使用默认阈值判定
pub fn is_acceptable(similarity: f64) -> bool {
    TextMatcher::default().is_acceptable(similarity)
}

/// 使用默认阈值比较并生成反馈
pub fn feedback(spoken: &str, target: &str) -> MatchResult {
    TextMatcher::default().compare(spoken, target)
}
