//! Voice module for kodama
//!
//! Text-to-Speech abstraction, the playback sink boundary, and the
//! controller that keeps the persona's voice and video in step.

pub mod controller;
pub mod providers;
mod sink;
mod tts;

pub use controller::{MediaSyncController, PlaybackState, SpeakOutcome, Utterance};
pub use sink::{PlaybackDone, PlaybackHandle, PlaybackSink};
pub use tts::{AudioClip, OutputFormat, TextToSpeech};
