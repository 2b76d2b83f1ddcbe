mod deepgram;
mod elevenlabs;
pub mod mappers;
mod openai;

pub use deepgram::DeepgramAdapter;
pub use elevenlabs::ElevenLabsAdapter;
pub use openai::OpenAiAdapter;
