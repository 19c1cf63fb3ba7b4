pub mod bridge;
pub mod builder;
pub mod completion;
pub mod config;
pub mod error;
mod process;
pub mod queue;

pub use bridge::{BridgeState, EngineBridge};
pub use builder::run_build;
pub use completion::{CompletionPolicy, LineCount, SingleLine, Terminator};
pub use config::{BridgeConfig, BuildCommand};
pub use error::EngineError;
