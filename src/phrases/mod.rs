// Phrases 模块 - 练习短语语料
//
// 架构：
// - types: 短语、难度与筛选条件
// - store: JSON 短语库（加载、去重、筛选、保存）
// - generator: LLM 按主题生成短语

mod generator;
mod store;
mod types;

pub use generator::{PhraseGenerator, MAX_PHRASES_PER_REQUEST};
pub use store::PhraseStore;
pub use types::{Difficulty, Phrase, PhraseFilter};
