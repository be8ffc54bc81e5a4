// 练习会话
//
// 持有短语语料、筛选条件、当前位置、复述计数器与会话统计
// 所有可变状态都在会话对象上，多会话互不影响
//
// 流程：转写文本 → 匹配 → 统计 → 计数器 → 返回结果（是否切换短语由调用方决定）

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::config::PracticeConfig;
use crate::matcher::{MatchResult, TextMatcher};
use crate::phrases::{Phrase, PhraseFilter};
use crate::practice::stats::SessionStats;
use crate::practice::tracker::{RepetitionProgress, RepetitionTracker};
use crate::speech::{truncate_text, AudioPayload, SpeechToText};

/// 一次尝试的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct AttemptOutcome {
    pub phrase: Phrase,
    pub spoken: String,
    pub result: MatchResult,
    pub progress: RepetitionProgress,
}

/// 练习会话
///
/// 非线程安全：所有修改都需要 `&mut self`，调用方串行访问
pub struct PracticeSession {
    id: String,
    phrases: Vec<Phrase>,
    filter: PhraseFilter,
    /// 当前筛选结果在 phrases 中的下标
    visible: Vec<usize>,
    position: usize,
    tracker: RepetitionTracker,
    stats: SessionStats,
    matcher: TextMatcher,
}

impl PracticeSession {
    /// 创建会话
    ///
    /// # Arguments
    /// * `phrases` - 短语语料（保持顺序，无效短语被剔除）
    /// * `config` - 练习配置（通过次数与阈值）
    pub fn new(phrases: Vec<Phrase>, config: &PracticeConfig) -> Self {
        let id = Uuid::new_v4().to_string();
        let total = phrases.len();
        let phrases: Vec<Phrase> = phrases
            .into_iter()
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Practice [{}]: 剔除无效短语: {}", &id[..8], e);
                    false
                }
            })
            .collect();
        if phrases.len() < total {
            tracing::info!("Practice [{}]: 有效短语 {}/{}", &id[..8], phrases.len(), total);
        }
        let visible = (0..phrases.len()).collect();

        tracing::info!(
            "Practice [{}]: 新会话, {} 条短语, required_reps={}, threshold={}",
            &id[..8],
            phrases.len(),
            config.required_reps,
            config.acceptance_threshold
        );

        Self {
            id,
            phrases,
            filter: PhraseFilter::all(),
            visible,
            position: 0,
            tracker: RepetitionTracker::new(config.required_reps),
            stats: SessionStats::default(),
            matcher: TextMatcher::new(config.acceptance_threshold),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 日志用短 ID
    fn short_id(&self) -> &str {
        &self.id[..8]
    }

    /// 当前短语，筛选结果为空时返回 None
    pub fn current_phrase(&self) -> Option<&Phrase> {
        self.visible
            .get(self.position)
            .and_then(|&idx| self.phrases.get(idx))
    }

    /// 当前位置（在筛选结果中的下标）
    pub fn position(&self) -> usize {
        self.position
    }

    /// 筛选结果数量
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn filter(&self) -> &PhraseFilter {
        &self.filter
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn progress(&self) -> RepetitionProgress {
        self.tracker.progress()
    }

    /// 下一条（末尾回到开头），重置计数器
    pub fn next(&mut self) -> Option<&Phrase> {
        if !self.visible.is_empty() {
            self.position = (self.position + 1) % self.visible.len();
        }
        self.on_phrase_changed("next");
        self.current_phrase()
    }

    /// 上一条（开头回到末尾），重置计数器
    pub fn previous(&mut self) -> Option<&Phrase> {
        if !self.visible.is_empty() {
            let len = self.visible.len();
            self.position = (self.position + len - 1) % len;
        }
        self.on_phrase_changed("previous");
        self.current_phrase()
    }

    /// 跳过当前短语
    pub fn skip(&mut self) -> Option<&Phrase> {
        tracing::debug!("Practice [{}]: 跳过第 {} 条", self.short_id(), self.position);
        self.next()
    }

    /// 切换筛选条件：回到第一条并重置计数器
    pub fn set_filter(&mut self, filter: PhraseFilter) -> Option<&Phrase> {
        self.visible = self
            .phrases
            .iter()
            .enumerate()
            .filter(|(_, p)| filter.matches(p))
            .map(|(idx, _)| idx)
            .collect();
        self.filter = filter;
        self.position = 0;

        tracing::info!(
            "Practice [{}]: 筛选条件变更 {:?}, 剩余 {} 条",
            self.short_id(),
            self.filter,
            self.visible.len()
        );
        self.on_phrase_changed("filter");
        self.current_phrase()
    }

    fn on_phrase_changed(&mut self, reason: &str) {
        self.tracker.reset();
        tracing::debug!(
            "Practice [{}]: 切换短语 ({}), 位置 {}/{}",
            self.short_id(),
            reason,
            self.position,
            self.visible.len()
        );
    }

    /// 提交一次转写文本
    ///
    /// 仅在没有可练习的短语时返回错误
    pub fn submit_transcription(&mut self, spoken: &str) -> Result<AttemptOutcome> {
        let phrase = self
            .current_phrase()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("当前筛选条件下没有可练习的短语"))?;

        let result = self.matcher.compare(spoken, &phrase.text);
        let progress = self.tracker.record_attempt(result.is_acceptable);
        self.stats.record(result.is_acceptable, progress.just_mastered);

        // 转写内容只记录摘要
        tracing::debug!(
            "Practice [{}]: 转写 hash={}, len={}, 目标=\"{}\"",
            self.short_id(),
            &format!("{:x}", md5::compute(spoken))[..8],
            spoken.chars().count(),
            truncate_text(&phrase.text, 30)
        );
        tracing::info!(
            "Practice [{}]: similarity={:.3}, acceptable={}, reps={}/{}, attempts={}, score={}",
            self.short_id(),
            result.similarity,
            result.is_acceptable,
            progress.successful_reps,
            progress.required_reps,
            self.stats.attempts,
            self.stats.score
        );
        if progress.just_mastered {
            tracing::info!("Practice [{}]: 已掌握 \"{}\"", self.short_id(), phrase.text);
        }

        Ok(AttemptOutcome {
            phrase,
            spoken: spoken.to_string(),
            result,
            progress,
        })
    }

    /// 转写录音后提交
    ///
    /// 转写失败时直接返回错误，不计入统计
    pub async fn submit_audio<S: SpeechToText>(
        &mut self,
        stt: &S,
        audio: &AudioPayload,
    ) -> Result<AttemptOutcome> {
        if self.current_phrase().is_none() {
            anyhow::bail!("当前筛选条件下没有可练习的短语");
        }

        let transcription = match stt.transcribe(audio).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Practice [{}]: 转写失败: {}", self.short_id(), e);
                return Err(e);
            }
        };

        if transcription.is_empty() {
            tracing::info!("Practice [{}]: 未识别到语音", self.short_id());
        }

        self.submit_transcription(&transcription.text)
    }
}
