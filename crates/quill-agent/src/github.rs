use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quill_core::{ContentEntry, Forge, NewPullRequest, PullRequest, QuillError};
use serde::{Deserialize, Serialize};

const GITHUB_API: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;

/// GitHub client bound to a single repository.
///
/// JSON routes go through `octocrab`; raw file content is fetched with
/// `reqwest` so it arrives undecoded.
///
/// # Examples
///
/// ```
/// use quill_agent::github::parse_repository;
///
/// let (owner, repo) = parse_repository("rust-lang/rust").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
    full_name: String,
}

impl GitHubClient {
    /// Create a client for `repository` (`owner/name`) authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Config`] if the repository name is malformed, or
    /// [`QuillError::Forge`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use quill_agent::github::GitHubClient;
    ///
    /// let client = GitHubClient::new("ghp_xxxx", "octocat/blog").unwrap();
    /// ```
    pub fn new(token: &str, repository: &str) -> Result<Self, QuillError> {
        let (owner, repo) = parse_repository(repository)?;

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| QuillError::Forge(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            token: token.to_string(),
            full_name: format!("{owner}/{repo}"),
            owner,
            repo,
        })
    }

    fn route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{tail}", self.owner, self.repo)
    }
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    html_url: String,
    head: CommitRef,
}

impl From<PullResponse> for PullRequest {
    fn from(p: PullResponse) -> Self {
        Self {
            number: p.number,
            title: p.title,
            html_url: p.html_url,
            head_sha: p.head.sha,
        }
    }
}

#[derive(Deserialize)]
struct PullFile {
    filename: String,
}

#[derive(Serialize)]
struct Page {
    per_page: usize,
    page: u32,
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

fn forge_error(action: &str, err: octocrab::Error) -> QuillError {
    QuillError::Forge(format!("failed to {action}: {err}"))
}

#[async_trait]
impl Forge for GitHubClient {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    async fn list_dir(&self, path: &str) -> Result<Option<Vec<ContentEntry>>, QuillError> {
        let route = self.route(&format!("contents/{path}"));
        match self
            .octocrab
            .get::<Vec<ContentEntry>, _, _>(route, None::<&()>)
            .await
        {
            Ok(entries) => Ok(Some(entries)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(forge_error(&format!("list {path}"), e)),
        }
    }

    async fn get_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, QuillError> {
        let url = format!(
            "{GITHUB_API}/repos/{}/{}/contents/{path}",
            self.owner, self.repo
        );

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.raw+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "quill");
        if let Some(r) = reference {
            request = request.query(&[("ref", r)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| QuillError::Forge(format!("failed to fetch {path}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::Forge(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| QuillError::Forge(format!("failed to read {path}: {e}")))
    }

    async fn branch_sha(&self, branch: &str) -> Result<String, QuillError> {
        let route = self.route(&format!("branches/{branch}"));
        let response: BranchResponse = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| forge_error(&format!("look up branch {branch}"), e))?;
        Ok(response.commit.sha)
    }

    async fn create_ref(&self, reference: &str, sha: &str) -> Result<(), QuillError> {
        let body = serde_json::json!({ "ref": reference, "sha": sha });
        let _response: serde_json::Value = self
            .octocrab
            .post(self.route("git/refs"), Some(&body))
            .await
            .map_err(|e| forge_error(&format!("create {reference}"), e))?;
        Ok(())
    }

    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<(), QuillError> {
        let body = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(content.as_bytes()),
            "branch": branch,
        });
        let _response: serde_json::Value = self
            .octocrab
            .put(self.route(&format!("contents/{path}")), Some(&body))
            .await
            .map_err(|e| forge_error(&format!("create {path}"), e))?;
        Ok(())
    }

    async fn create_pull(&self, pull: &NewPullRequest) -> Result<PullRequest, QuillError> {
        let response: PullResponse = self
            .octocrab
            .post(self.route("pulls"), Some(pull))
            .await
            .map_err(|e| forge_error("open pull request", e))?;
        Ok(response.into())
    }

    async fn get_pull(&self, number: u64) -> Result<PullRequest, QuillError> {
        let response: PullResponse = self
            .octocrab
            .get(self.route(&format!("pulls/{number}")), None::<&()>)
            .await
            .map_err(|e| forge_error(&format!("fetch pull request #{number}"), e))?;
        Ok(response.into())
    }

    async fn list_pull_files(&self, number: u64) -> Result<Vec<String>, QuillError> {
        let route = self.route(&format!("pulls/{number}/files"));
        let mut files = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<PullFile> = self
                .octocrab
                .get(
                    &route,
                    Some(&Page {
                        per_page: PAGE_SIZE,
                        page,
                    }),
                )
                .await
                .map_err(|e| forge_error(&format!("list files of #{number}"), e))?;
            let done = batch.len() < PAGE_SIZE;
            files.extend(batch.into_iter().map(|f| f.filename));
            if done {
                break;
            }
            page += 1;
        }
        tracing::debug!(number, count = files.len(), "listed pull request files");
        Ok(files)
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), QuillError> {
        let payload = serde_json::json!({ "body": body });
        let _response: serde_json::Value = self
            .octocrab
            .post(self.route(&format!("issues/{number}/comments")), Some(&payload))
            .await
            .map_err(|e| forge_error(&format!("comment on #{number}"), e))?;
        Ok(())
    }
}

/// Parse a repository full name (`owner/name`) into its components.
///
/// # Errors
///
/// Returns [`QuillError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use quill_agent::github::parse_repository;
///
/// assert!(parse_repository("octocat").is_err());
/// ```
pub fn parse_repository(full_name: &str) -> Result<(String, String), QuillError> {
    let Some((owner, repo)) = full_name.trim().split_once('/') else {
        return Err(QuillError::Config(format!(
            "invalid repository '{full_name}', expected owner/name"
        )));
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(QuillError::Config(format!(
            "invalid repository '{full_name}', expected owner/name"
        )));
    }
    Ok((owner.to_string(), repo.to_string()))
}
