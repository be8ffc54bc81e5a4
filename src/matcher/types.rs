//! 匹配层类型定义

use serde::{Deserialize, Serialize};

/// 反馈分档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    /// similarity < 0.5
    Unclear,
    /// 0.5 ≤ similarity < 0.7
    Close,
    /// 0.7 ≤ similarity < 0.9
    AlmostPerfect,
    /// similarity ≥ 0.9
    Excellent,
}

impl FeedbackTier {
    /// 按相似度归档（从低到高，先命中者胜出）
    pub fn classify(similarity: f64) -> Self {
        if similarity < 0.5 {
            FeedbackTier::Unclear
        } else if similarity < 0.7 {
            FeedbackTier::Close
        } else if similarity < 0.9 {
            FeedbackTier::AlmostPerfect
        } else {
            FeedbackTier::Excellent
        }
    }

    /// 展示给学习者的提示语
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Unclear => "Try speaking more clearly and slowly",
            FeedbackTier::Close => "Good attempt! Focus on the pronunciation of individual words",
            FeedbackTier::AlmostPerfect => "Almost perfect! Just a few minor adjustments needed",
            FeedbackTier::Excellent => "Excellent pronunciation!",
        }
    }
}

/// 一次比较的结果
///
/// 每次比较新建，不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 相似度 (0.0 - 1.0)
    pub similarity: f64,
    /// 是否算作一次正确复述
    pub is_acceptable: bool,
    /// 反馈提示（至少一条）
    pub suggestions: Vec<String>,
}

impl MatchResult {
    /// 当前结果所属的反馈分档
    pub fn tier(&self) -> FeedbackTier {
        FeedbackTier::classify(self.similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(FeedbackTier::classify(0.0), FeedbackTier::Unclear);
        assert_eq!(FeedbackTier::classify(0.4999), FeedbackTier::Unclear);
        assert_eq!(FeedbackTier::classify(0.5), FeedbackTier::Close);
        assert_eq!(FeedbackTier::classify(0.6999), FeedbackTier::Close);
        assert_eq!(FeedbackTier::classify(0.7), FeedbackTier::AlmostPerfect);
        assert_eq!(FeedbackTier::classify(0.8999), FeedbackTier::AlmostPerfect);
        assert_eq!(FeedbackTier::classify(0.9), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::classify(1.0), FeedbackTier::Excellent);
    }

    #[test]
    fn test_serialize_result() {
        let result = MatchResult {
            similarity: 1.0,
            is_acceptable: true,
            suggestions: vec![FeedbackTier::Excellent.message().to_string()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_acceptable"], true);
        assert_eq!(json["suggestions"][0], "Excellent pronunciation!");
    }
}
