// Practice 模块 - 复述练习
//
// 架构：
// - tracker: 单个短语的复述计数状态机
// - stats: 跨短语的会话统计（尝试次数、得分）
// - session: 练习会话（短语导航、筛选、提交尝试）

mod session;
mod stats;
mod tracker;

pub use session::{AttemptOutcome, PracticeSession};
pub use stats::SessionStats;
pub use tracker::{RepetitionProgress, RepetitionState, RepetitionTracker};
