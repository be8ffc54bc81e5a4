// 会话级统计
//
// 跨短语累计，只在新建会话时清零

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// 总尝试次数（无论是否通过）
    pub attempts: u32,
    /// 通过次数
    pub score: u32,
    /// 已掌握的短语数
    pub mastered: u32,
}

impl SessionStats {
    pub fn record(&mut self, is_acceptable: bool, just_mastered: bool) {
        self.attempts += 1;
        if is_acceptable {
            self.score += 1;
        }
        if just_mastered {
            self.mastered += 1;
        }
    }

    /// 通过率 (0.0 - 1.0)，无尝试时为 0
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.score as f64 / self.attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut stats = SessionStats::default();
        stats.record(true, false);
        stats.record(false, false);
        stats.record(true, true);

        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.score, 2);
        assert_eq!(stats.mastered, 1);
        assert!((stats.accuracy() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_without_attempts() {
        assert_eq!(SessionStats::default().accuracy(), 0.0);
    }
}
