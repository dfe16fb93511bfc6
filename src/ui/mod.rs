//! Terminal UI layer for the interactive chat session.
//!
//! - [`chat_loop`]: the event loop that turns key presses into session
//!   changes and forwards completions from [`crate::core::chat_stream`].
//! - [`state`]: editors, focus, status line, and scroll position around a
//!   [`crate::core::session::Session`].
//! - [`renderer`], [`markdown`], and [`scroll`]: frame composition.
//! - [`theme`]: style policy.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod scroll;
pub mod state;
pub mod theme;
