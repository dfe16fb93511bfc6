//! Main chat event loop and the pieces it drives: key mapping, terminal
//! setup and teardown, and the background completion task.

mod event_loop;
pub mod keybindings;
mod lifecycle;
pub mod stream;

pub use event_loop::run_chat;
