pub mod chat_stream;
pub mod config;
pub mod conversation;
pub mod message;
pub mod prompt;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
