pub mod catalog;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod input;
pub mod shortcuts;

pub use commands::{Command, CommandExecution, CommandRegistry, Dispatcher};
pub use config::EditorConfig;
pub use editor::{Canvas, Editor};
pub use error::CommandError;
pub use events::{DragChannel, DragPhase, EventHub, Subscription};
pub use input::Modifiers;
