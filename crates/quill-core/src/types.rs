use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata of a published post, derived from its front matter.
///
/// Lives for a single run; the repository is the system of record.
///
/// # Examples
///
/// ```
/// use quill_core::PostMetadata;
///
/// let post = PostMetadata::untitled("0003-traits");
/// assert_eq!(post.title, "0003-traits");
/// assert!(post.tags.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMetadata {
    /// Directory name under the posts root (`NNNN-slug`).
    pub dirname: String,
    /// Post title, falling back to the directory name.
    pub title: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Ordered category list.
    pub categories: Vec<String>,
    /// One-line description.
    pub description: String,
}

impl PostMetadata {
    /// Metadata for a post whose front matter carried nothing usable.
    pub fn untitled(dirname: &str) -> Self {
        Self {
            dirname: dirname.to_string(),
            title: dirname.to_string(),
            tags: Vec::new(),
            categories: Vec::new(),
            description: String::new(),
        }
    }
}

/// The next post to write, as proposed by the model.
///
/// # Examples
///
/// ```
/// use quill_core::TopicProposal;
///
/// let json = r#"{
///     "title": "Ownership",
///     "slug": "ownership",
///     "description": "Who owns what",
///     "tags": ["ownership"]
/// }"#;
/// let topic: TopicProposal = serde_json::from_str(json).unwrap();
/// assert_eq!(topic.categories, vec!["rust"]);
/// assert!(topic.outline.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicProposal {
    /// Post title.
    pub title: String,
    /// Short kebab-case slug, used in the directory and branch names.
    pub slug: String,
    /// One-sentence description.
    pub description: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Ordered category list (default: `["rust"]`).
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Suggested section outline, in order.
    #[serde(default)]
    pub outline: Vec<String>,
}

fn default_categories() -> Vec<String> {
    vec!["rust".into()]
}

/// The post file selected from a pull request for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTarget {
    /// Repository path of the post document.
    pub path: String,
    /// UTF-8 content at the pull request head.
    pub content: String,
}

/// A value that was either found or is absent for a known, benign reason.
///
/// Used wherever absence is an expected outcome rather than a failure.
///
/// # Examples
///
/// ```
/// use quill_core::{Absence, Extracted};
///
/// let found: Extracted<u32> = Extracted::Present(3);
/// assert_eq!(found.present(), Some(3));
///
/// let missing: Extracted<u32> = Extracted::Absent(Absence::NoDelimiter);
/// assert!(!missing.is_present());
/// assert_eq!(missing.unwrap_or_default(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    /// The value was found.
    Present(T),
    /// Nothing was found; the reason is kept for logging.
    Absent(Absence),
}

impl<T> Extracted<T> {
    /// Returns `true` for [`Extracted::Present`].
    pub fn is_present(&self) -> bool {
        matches!(self, Extracted::Present(_))
    }

    /// Converts into an `Option`, discarding the absence reason.
    pub fn present(self) -> Option<T> {
        match self {
            Extracted::Present(v) => Some(v),
            Extracted::Absent(_) => None,
        }
    }

    /// The absence reason, if any.
    pub fn absence(&self) -> Option<&Absence> {
        match self {
            Extracted::Present(_) => None,
            Extracted::Absent(reason) => Some(reason),
        }
    }
}

impl<T: Default> Extracted<T> {
    /// The value, or `T::default()` when absent.
    pub fn unwrap_or_default(self) -> T {
        self.present().unwrap_or_default()
    }
}

/// Why an [`Extracted`] value is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Absence {
    /// The document does not start with a front matter delimiter.
    NoDelimiter,
    /// The front matter block has no closing delimiter.
    Unterminated,
    /// The front matter block is not a valid key/value mapping.
    Malformed(String),
    /// The path does not exist on the forge.
    NotFound(String),
    /// No changed file in the pull request is a post document.
    NoMatchingFile,
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Absence::NoDelimiter => write!(f, "no front matter delimiter"),
            Absence::Unterminated => write!(f, "unterminated front matter"),
            Absence::Malformed(e) => write!(f, "malformed front matter: {e}"),
            Absence::NotFound(path) => write!(f, "not found: {path}"),
            Absence::NoMatchingFile => write!(f, "no post document among changed files"),
        }
    }
}

/// Kind of an entry in a forge directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symlink.
    Symlink,
    /// Git submodule.
    Submodule,
}

/// An entry in a forge directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Last path component.
    pub name: String,
    /// Full repository path.
    pub path: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A pull request as returned by the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Browser URL.
    pub html_url: String,
    /// SHA of the head commit.
    pub head_sha: String,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    /// Pull request title.
    pub title: String,
    /// Source branch.
    pub head: String,
    /// Target branch.
    pub base: String,
    /// Markdown body.
    pub body: String,
    /// Open as draft.
    pub draft: bool,
}
