// 复述计数状态机
//
// 每个"当前短语"一个实例：通过一次 +1，达到要求次数即掌握；
// 未通过不改变计数，只有切换短语才会 reset

use serde::Serialize;

/// 复述状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "successful_reps", rename_all = "snake_case")]
pub enum RepetitionState {
    /// 进行中（已通过次数 < 要求次数）
    InProgress(u32),
    /// 已掌握（当前短语的终态）
    Mastered,
}

/// 一次记录后的进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepetitionProgress {
    pub successful_reps: u32,
    pub required_reps: u32,
    pub is_mastered: bool,
    /// 本次调用刚好达成掌握（每次掌握只为 true 一次）
    pub just_mastered: bool,
}

/// 复述计数器
///
/// 非线程安全，调用方需串行访问
#[derive(Debug, Clone)]
pub struct RepetitionTracker {
    required_reps: u32,
    successful_reps: u32,
}

impl RepetitionTracker {
    /// 创建计数器，required_reps 为 0 时按 1 处理
    pub fn new(required_reps: u32) -> Self {
        Self {
            required_reps: required_reps.max(1),
            successful_reps: 0,
        }
    }

    pub fn required_reps(&self) -> u32 {
        self.required_reps
    }

    pub fn successful_reps(&self) -> u32 {
        self.successful_reps
    }

    pub fn is_mastered(&self) -> bool {
        self.successful_reps >= self.required_reps
    }

    pub fn state(&self) -> RepetitionState {
        if self.is_mastered() {
            RepetitionState::Mastered
        } else {
            RepetitionState::InProgress(self.successful_reps)
        }
    }

    /// 记录一次尝试
    ///
    /// - 通过：计数 +1（不超过 required_reps），首次达到时 just_mastered = true
    /// - 未通过：状态不变
    pub fn record_attempt(&mut self, is_acceptable: bool) -> RepetitionProgress {
        let was_mastered = self.is_mastered();

        if is_acceptable && !was_mastered {
            self.successful_reps += 1;
        }

        RepetitionProgress {
            just_mastered: !was_mastered && self.is_mastered(),
            ..self.progress()
        }
    }

    /// 当前进度（不修改状态）
    pub fn progress(&self) -> RepetitionProgress {
        RepetitionProgress {
            successful_reps: self.successful_reps,
            required_reps: self.required_reps,
            is_mastered: self.is_mastered(),
            just_mastered: false,
        }
    }

    /// 回到 InProgress(0)
    pub fn reset(&mut self) {
        self.successful_reps = 0;
    }
}

impl Default for RepetitionTracker {
    fn default() -> Self {
        Self::new(5)
    }
}
