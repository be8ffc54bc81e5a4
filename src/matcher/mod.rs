//! 发音匹配层
//!
//! 将 STT 转写文本与目标短语做纯文本比较，给出相似度与是否通过。
//!
//! ## 处理流程
//! 1. 小写 + NFD 分解 + 去除组合重音符（é → e）
//! 2. 去除标点（保留单词字符与空白）
//! 3. Levenshtein 编辑距离 → 相似度
//! 4. 阈值判定 + 分档反馈

mod engine;
mod normalize;
mod similarity;
mod types;

pub use engine::{feedback, is_acceptable, TextMatcher, DEFAULT_ACCEPTANCE_THRESHOLD};
pub use normalize::normalize;
pub use similarity::similarity;
pub use types::{FeedbackTier, MatchResult};
