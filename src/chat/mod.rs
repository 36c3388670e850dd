//! Chat API: bounded recent-chat listing for the sidebar, transcripts,
//! and message send with an Anthropic-generated reply.

pub mod anthropic;
pub mod handlers;

pub use anthropic::{AnthropicClient, PromptMessage};

/// Upper bound on the sidebar listing; the client asks for at most
/// this many recent chats.
pub const MAX_CHAT_LIST: i64 = 30;

/// Clamps a requested page size into `1..=MAX_CHAT_LIST`, defaulting
/// to the maximum when absent.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(MAX_CHAT_LIST).clamp(1, MAX_CHAT_LIST)
}
