//! Core types, configuration, and error handling for Quill.
//!
//! This crate provides the shared foundation used by the other Quill crates:
//! - [`QuillError`]: unified error type using `thiserror`
//! - [`QuillConfig`]: configuration loaded from `.quill.toml` and the environment
//! - [`Forge`] and [`ChatModel`]: the two external collaborators
//! - Shared types: [`PostMetadata`], [`TopicProposal`], [`ReviewTarget`], [`Extracted`]

mod chat;
mod config;
mod error;
mod forge;
mod types;

pub use chat::{ChatMessage, ChatModel, ChatRequest, Role};
pub use config::{
    parse_content_budget, BlogConfig, GitHubConfig, LlmConfig, Pipeline, QuillConfig,
    ReviewConfig, DEFAULT_MAX_CONTENT_CHARS,
};
pub use error::QuillError;
pub use forge::Forge;
pub use types::{
    Absence, ContentEntry, EntryKind, Extracted, NewPullRequest, PostMetadata, PullRequest,
    ReviewTarget, TopicProposal,
};

/// A convenience `Result` type for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;
