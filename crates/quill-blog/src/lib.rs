//! Blog layout conventions shared by the Quill pipelines.
//!
//! - [`front_matter`]: parsing the YAML block at the top of a post
//! - [`layout`]: sequence numbers, directory, file and branch names
//! - [`posts`]: reading existing post metadata through a [`quill_core::Forge`]

pub mod front_matter;
pub mod layout;
pub mod posts;
