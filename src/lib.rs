//! Backend for the smart grocery assistant: the web-automation decision loop
//! behind the browser extension, plus room tokens for the voice client.

pub mod brain;
pub mod config;
pub mod error;
pub mod face;
pub mod llm;
pub mod memory;
pub mod token;
pub mod types;

pub use brain::{Brain, Decision};
pub use config::Config;
pub use error::{DecideError, ErrorPayload, StoreError};
pub use face::{AppState, router};
pub use llm::{ChatCompletionsClient, TextGenerator};
pub use memory::{Session, SessionStore, Step};
pub use types::{Action, ActionKind, ActionStatus};
