pub mod google_stt;
pub mod google_tts;
mod types;
mod utils;

pub use google_stt::GoogleSpeechClient;
pub use google_tts::GoogleTtsClient;
pub use types::{
    AudioEncoding, AudioPayload, SpeechToText, SynthesizedAudio, TextToSpeech, Transcription,
};
pub(crate) use utils::truncate_text;
