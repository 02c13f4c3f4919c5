pub mod openai;
pub mod silent;

pub use openai::OpenAiSpeech;
pub use silent::SilentSpeech;
