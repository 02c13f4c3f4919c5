pub mod api_types;
pub mod call;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod recommend;
pub mod retry;
pub mod session;

pub use call::{CallTurn, VideoCall};
pub use prompts::{Directive, PromptAssembler};
pub use session::{DialogueSession, ReplyOutcome};
