//! Sewbot is a terminal chat assistant for planning sewing projects.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation log, the editable system prompt,
//!   configuration, and the streaming completion gateway.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the chat completion payloads exchanged with the service.
//! - [`logging`] installs the optional file-backed diagnostics subscriber.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings and hands off to
//! [`ui::chat_loop`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
