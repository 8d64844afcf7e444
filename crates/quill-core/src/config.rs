use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QuillError;

/// Truncation budget applied to post content before review (characters).
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 12_000;

/// Top-level configuration loaded from `.quill.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// The resolved value is passed explicitly to every component.
///
/// # Examples
///
/// ```
/// use quill_core::QuillConfig;
///
/// let config = QuillConfig::default();
/// assert_eq!(config.blog.posts_dir, "posts");
/// assert_eq!(config.review.max_content_chars, 12_000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Blog layout and persona.
    #[serde(default)]
    pub blog: BlogConfig,
    /// Inference provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Reviewer settings.
    #[serde(default)]
    pub review: ReviewConfig,
    /// Source-control host settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

/// Which pipeline a configuration is being resolved for.
///
/// The reviewer honours a few extra environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Topic & draft generator.
    Generate,
    /// Draft reviewer.
    Review,
}

impl QuillConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Io`] if the file cannot be read, or
    /// [`QuillError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, QuillError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::QuillConfig;
    ///
    /// let toml = r#"
    /// [blog]
    /// main_branch = "master"
    /// "#;
    /// let config = QuillConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.blog.main_branch, "master");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, QuillError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    ///
    /// `lookup` abstracts `std::env::var` so the layering can be tested.
    /// Recognised variables: `GITHUB_TOKEN`, `HF_TOKEN`, `GITHUB_REPOSITORY`,
    /// and for the reviewer `GH_PAT` (preferred over `GITHUB_TOKEN`),
    /// `MODEL_ID` and `CONTENT_MAX_TOKENS`. Empty values are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_core::{Pipeline, QuillConfig};
    ///
    /// let config = QuillConfig::default().with_env(Pipeline::Review, |key| match key {
    ///     "CONTENT_MAX_TOKENS" => Some("abc".into()),
    ///     "MODEL_ID" => Some("my/model".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.review.max_content_chars, 12_000);
    /// assert_eq!(config.llm.reviewer_model, "my/model");
    /// ```
    pub fn with_env<F>(mut self, pipeline: Pipeline, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = match pipeline {
            Pipeline::Review => var("GH_PAT").or_else(|| var("GITHUB_TOKEN")),
            Pipeline::Generate => var("GITHUB_TOKEN"),
        };
        if let Some(token) = token {
            self.github.token = Some(token);
        }
        if let Some(repo) = var("GITHUB_REPOSITORY") {
            self.github.repository = Some(repo);
        }
        if let Some(key) = var("HF_TOKEN") {
            self.llm.api_key = Some(key);
        }

        if pipeline == Pipeline::Review {
            if let Some(model) = var("MODEL_ID") {
                self.llm.reviewer_model = model;
            }
            if let Some(budget) = lookup("CONTENT_MAX_TOKENS")
                .as_deref()
                .and_then(parse_content_budget)
            {
                self.review.max_content_chars = budget;
            }
        }
        self
    }

    /// The forge token, or a configuration error naming the variable.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] when no token was configured.
    pub fn require_github_token(&self) -> Result<&str, QuillError> {
        self.github
            .token
            .as_deref()
            .ok_or_else(|| QuillError::Config("GITHUB_TOKEN not set".into()))
    }

    /// The `owner/name` of the target repository.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] when no repository was configured.
    pub fn require_repository(&self) -> Result<&str, QuillError> {
        self.github
            .repository
            .as_deref()
            .ok_or_else(|| QuillError::Config("GITHUB_REPOSITORY not set".into()))
    }

    /// The inference API token.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] when no token was configured.
    pub fn require_llm_key(&self) -> Result<&str, QuillError> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| QuillError::Config("HF_TOKEN not set".into()))
    }
}

/// Parse a reviewer content budget override.
///
/// Only a positive integer counts; anything else leaves the configured
/// budget in place.
///
/// # Examples
///
/// ```
/// use quill_core::parse_content_budget;
///
/// assert_eq!(parse_content_budget(" 4000 "), Some(4000));
/// assert_eq!(parse_content_budget("lots"), None);
/// assert_eq!(parse_content_budget("0"), None);
/// ```
pub fn parse_content_budget(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

/// Blog layout and authoring persona.
///
/// # Examples
///
/// ```
/// use quill_core::BlogConfig;
///
/// let blog = BlogConfig::default();
/// assert_eq!(blog.post_filename, "README.md");
/// assert!(blog.persona().contains("Desbravando Rust"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Blog name used in prompts.
    #[serde(default = "default_blog_name")]
    pub name: String,
    /// Language every post must be written in.
    #[serde(default = "default_language")]
    pub language: String,
    /// Root directory holding one subdirectory per post.
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,
    /// Fixed document name inside each post directory.
    #[serde(default = "default_post_filename")]
    pub post_filename: String,
    /// Branch pull requests target.
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    /// How many recent titles to include when drafting (default: 5).
    #[serde(default = "default_recent_posts")]
    pub recent_posts: usize,
    /// Replaces the built-in persona text when set.
    pub context: Option<String>,
}

fn default_blog_name() -> String {
    "Desbravando Rust".into()
}

fn default_language() -> String {
    "Brazilian Portuguese (PT-BR)".into()
}

fn default_posts_dir() -> String {
    "posts".into()
}

fn default_post_filename() -> String {
    "README.md".into()
}

fn default_main_branch() -> String {
    "main".into()
}

fn default_recent_posts() -> usize {
    5
}

impl BlogConfig {
    /// Persona/context paragraph that opens every generation prompt.
    pub fn persona(&self) -> String {
        if let Some(ctx) = &self.context {
            return ctx.clone();
        }
        format!(
            "You are a technical writer specialised in Rust and Python.\n\
             The blog '{name}' is written for programmers who already know Python \
             and want to learn Rust, and it accompanies the book '{name}'.\n\
             ALWAYS write in {language}, in accessible, didactic language.",
            name = self.name,
            language = self.language,
        )
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            name: default_blog_name(),
            language: default_language(),
            posts_dir: default_posts_dir(),
            post_filename: default_post_filename(),
            main_branch: default_main_branch(),
            recent_posts: default_recent_posts(),
            context: None,
        }
    }
}

/// Inference provider configuration.
///
/// # Examples
///
/// ```
/// use quill_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.generator_model, "mistralai/Mistral-7B-Instruct-v0.3");
/// assert_eq!(config.reviewer_model, "deepseek-ai/DeepSeek-V3-0324");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: Option<String>,
    /// Model used for topic selection and drafting.
    #[serde(default = "default_generator_model")]
    pub generator_model: String,
    /// Model used for reviews.
    #[serde(default = "default_reviewer_model")]
    pub reviewer_model: String,
    /// API token for the provider.
    pub api_key: Option<String>,
}

fn default_generator_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.3".into()
}

fn default_reviewer_model() -> String {
    "deepseek-ai/DeepSeek-V3-0324".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            generator_model: default_generator_model(),
            reviewer_model: default_reviewer_model(),
            api_key: None,
        }
    }
}

/// Reviewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Characters of post content sent for review (default: 12000).
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_max_content_chars() -> usize {
    DEFAULT_MAX_CONTENT_CHARS
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_content_chars: default_max_content_chars(),
        }
    }
}

/// Source-control host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Target repository as `owner/name`.
    pub repository: Option<String>,
    /// Access token. Prefer the environment over the config file.
    pub token: Option<String>,
}
