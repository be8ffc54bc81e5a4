//! `parler` -- 法语发音练习命令行
//!
//! - `parler practice` -- 交互式复述练习
//! - `parler check` -- 单次比较转写文本与目标短语
//! - `parler transcribe` -- 转写音频文件
//! - `parler speak` -- 合成短语读音
//! - `parler generate` -- 按主题生成短语并写入短语库
//! - `parler config` -- 查看当前配置

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use parler_lib::practice::AttemptOutcome;
use parler_lib::speech::{
    AudioPayload, GoogleSpeechClient, GoogleTtsClient, SpeechToText, TextToSpeech,
};
use parler_lib::{
    feedback, AppConfig, Difficulty, OpenAiClientConfig, PhraseFilter, PhraseGenerator,
    PhraseStore, PracticeSession,
};

#[derive(Parser)]
#[command(name = "parler", about = "French pronunciation practice", version)]
struct Cli {
    /// 输出 debug 日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 交互式练习：输入转写文本，或 `:audio <文件>` 走语音识别
    Practice {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// 短语集
        #[arg(long = "set")]
        phrase_set: Option<String>,
        /// 短语库文件（覆盖配置）
        #[arg(long)]
        phrases: Option<PathBuf>,
    },

    /// 比较一次转写文本与目标短语，输出 JSON
    Check { target: String, spoken: String },

    /// 转写音频文件
    Transcribe {
        file: PathBuf,
        /// MIME 类型（默认按扩展名推断）
        #[arg(long)]
        mime: Option<String>,
    },

    /// 合成读音（MP3）
    Speak {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// 按主题生成短语并写入短语库
    Generate {
        topic: String,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value = "beginner")]
        difficulty: Difficulty,
    },

    /// 查看配置
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    parler_lib::init_logging(cli.verbose);

    match cli.command {
        Commands::Practice {
            category,
            difficulty,
            phrase_set,
            phrases,
        } => {
            let filter = PhraseFilter {
                category,
                difficulty,
                phrase_set,
            };
            run_practice(filter, phrases).await?
        }
        Commands::Check { target, spoken } => {
            let result = feedback(&spoken, &target);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Transcribe { file, mime } => {
            let config = AppConfig::load()?;
            let stt = GoogleSpeechClient::from_config(&config.speech)?;
            let audio = read_audio(&file, mime).await?;
            let transcription = stt.transcribe(&audio).await?;
            println!("{}", serde_json::to_string_pretty(&transcription)?);
        }
        Commands::Speak { text, output } => {
            let config = AppConfig::load()?;
            let tts = GoogleTtsClient::from_config(&config.speech)?;
            let audio = tts.synthesize(&text).await?;
            tokio::fs::write(&output, &audio.bytes).await?;
            println!("✓ {} bytes → {}", audio.bytes.len(), output.display());
        }
        Commands::Generate {
            topic,
            count,
            difficulty,
        } => run_generate(&topic, count, difficulty).await?,
        Commands::Config => {
            let config = AppConfig::load()?;
            println!("配置文件: {}", AppConfig::config_path()?.display());
            println!("短语库:   {}", config.resolve_phrases_path()?.display());
            println!("required_reps:        {}", config.practice.required_reps);
            println!("acceptance_threshold: {}", config.practice.acceptance_threshold);
            println!("speech.language_code: {}", config.speech.language_code);
            println!(
                "speech.api_key:       {}",
                if config.speech.api_key.is_empty() { "未配置" } else { "已配置" }
            );
            println!(
                "llm:                  {} ({})",
                config.llm.model,
                if config.llm.is_valid() { "可用" } else { "未配置" }
            );
        }
    }

    Ok(())
}

async fn read_audio(file: &Path, mime: Option<String>) -> Result<AudioPayload> {
    if !file.exists() {
        anyhow::bail!("文件不存在: {}", file.display());
    }
    let bytes = tokio::fs::read(file).await?;
    let mime = mime.unwrap_or_else(|| AudioPayload::mime_from_extension(file).to_string());
    Ok(AudioPayload::new(bytes, mime))
}

async fn run_practice(filter: PhraseFilter, phrases_override: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load()?;
    let phrases_path = match phrases_override {
        Some(path) => path,
        None => config.resolve_phrases_path()?,
    };
    let store = PhraseStore::load(&phrases_path)?;

    let stt = if config.speech.api_key.trim().is_empty() {
        None
    } else {
        Some(GoogleSpeechClient::from_config(&config.speech)?)
    };

    let mut session = PracticeSession::new(store.into_phrases(), &config.practice);
    if !filter.is_empty() {
        session.set_filter(filter);
    }
    if session.is_empty() {
        anyhow::bail!("筛选条件下没有短语");
    }

    println!("=== Parler ===");
    println!("输入你说出的内容（或 :audio <文件> [MIME]），:next :prev :skip :stats :quit\n");
    print_current(&session);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();

        let outcome = match input {
            "" => continue,
            ":quit" | ":q" => break,
            ":next" => {
                session.next();
                print_current(&session);
                continue;
            }
            ":prev" => {
                session.previous();
                print_current(&session);
                continue;
            }
            ":skip" => {
                session.skip();
                print_current(&session);
                continue;
            }
            ":stats" => {
                print_stats(&session);
                continue;
            }
            cmd if cmd.starts_with(":audio") => {
                let Some(stt) = stt.as_ref() else {
                    println!("未配置语音识别（speech.api_key / GOOGLE_API_KEY）");
                    continue;
                };
                let mut parts = cmd.split_whitespace().skip(1);
                let Some(file) = parts.next() else {
                    println!("用法: :audio <文件> [MIME]");
                    continue;
                };
                let audio = match read_audio(Path::new(file), parts.next().map(String::from)).await {
                    Ok(audio) => audio,
                    Err(e) => {
                        println!("读取音频失败: {}", e);
                        continue;
                    }
                };
                match session.submit_audio(stt, &audio).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        println!("转写失败: {}", e);
                        continue;
                    }
                }
            }
            spoken => session.submit_transcription(spoken)?,
        };

        print_outcome(&outcome);
        if outcome.progress.just_mastered {
            println!("🎉 已掌握！进入下一条\n");
            session.next();
            print_current(&session);
        }
    }

    print_stats(&session);
    Ok(())
}

fn print_current(session: &PracticeSession) {
    if let Some(phrase) = session.current_phrase() {
        println!(
            "[{}/{}] {}  ({}, {})",
            session.position() + 1,
            session.len(),
            phrase.text,
            phrase.category,
            phrase.difficulty
        );
        if !phrase.translation.is_empty() {
            println!("      {}", phrase.translation);
        }
    }
}

fn print_outcome(outcome: &AttemptOutcome) {
    let mark = if outcome.result.is_acceptable { "✓" } else { "✗" };
    println!(
        "{} \"{}\"  相似度 {:.0}%  [{}/{}]",
        mark,
        outcome.spoken,
        outcome.result.similarity * 100.0,
        outcome.progress.successful_reps,
        outcome.progress.required_reps
    );
    for suggestion in &outcome.result.suggestions {
        println!("  {}", suggestion);
    }
}

fn print_stats(session: &PracticeSession) {
    let stats = session.stats();
    println!(
        "尝试 {} 次，通过 {} 次（{:.0}%），掌握 {} 条",
        stats.attempts,
        stats.score,
        stats.accuracy() * 100.0,
        stats.mastered
    );
}

async fn run_generate(topic: &str, count: usize, difficulty: Difficulty) -> Result<()> {
    let config = AppConfig::load()?;
    if !config.llm.is_valid() {
        anyhow::bail!("LLM 未配置（llm.api_key 或环境变量 OPENAI_API_KEY）");
    }

    let generator = PhraseGenerator::new(OpenAiClientConfig::new(
        &config.llm.endpoint,
        &config.llm.api_key,
        &config.llm.model,
    ));
    let generated = generator.generate(topic, count, difficulty).await?;

    let path = config.resolve_phrases_path()?;
    let mut store = PhraseStore::load(&path)?;
    for phrase in &generated {
        println!("+ {}  ({})", phrase.text, phrase.translation);
    }
    let added = store.merge(generated);
    store.save(&path)?;

    println!("新增 {} 条，短语库共 {} 条: {}", added, store.len(), path.display());
    Ok(())
}
