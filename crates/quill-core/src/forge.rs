use async_trait::async_trait;

use crate::error::QuillError;
use crate::types::{ContentEntry, NewPullRequest, PullRequest};

/// Repository operations on the source-control host.
///
/// Implementations are bound to one repository. Lookups return `Ok(None)`
/// when the path does not exist; every other failure is a
/// [`QuillError::Forge`].
#[async_trait]
pub trait Forge: Send + Sync {
    /// Repository full name (`owner/name`).
    fn full_name(&self) -> &str;

    /// List the immediate entries of a directory on the default branch.
    async fn list_dir(&self, path: &str) -> Result<Option<Vec<ContentEntry>>, QuillError>;

    /// Fetch a file as UTF-8 text, optionally at a branch or commit.
    async fn get_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, QuillError>;

    /// SHA of the tip commit of `branch`.
    async fn branch_sha(&self, branch: &str) -> Result<String, QuillError>;

    /// Create a git reference (e.g. `refs/heads/topic`) pointing at `sha`.
    async fn create_ref(&self, reference: &str, sha: &str) -> Result<(), QuillError>;

    /// Create a new file on `branch` in a single commit.
    ///
    /// Fails if the file already exists.
    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<(), QuillError>;

    /// Open a pull request.
    async fn create_pull(&self, pull: &NewPullRequest) -> Result<PullRequest, QuillError>;

    /// Look up a pull request by number.
    async fn get_pull(&self, number: u64) -> Result<PullRequest, QuillError>;

    /// Paths of every file changed by a pull request, in forge order.
    async fn list_pull_files(&self, number: u64) -> Result<Vec<String>, QuillError>;

    /// Post an issue-level comment on a pull request.
    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), QuillError>;
}
