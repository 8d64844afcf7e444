//! Post drafting and review orchestration.
//!
//! Provides the two pipelines ([`generator`], [`reviewer`]), the GitHub
//! client, the inference client, and the text templates they send.

pub mod generator;
pub mod github;
pub mod llm;
pub mod progress;
pub mod prompt;
pub mod render;
pub mod reviewer;
