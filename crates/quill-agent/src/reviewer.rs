//! Draft reviewer: critique the post added by a pull request and comment on it.

use quill_blog::layout::is_post_document;
use quill_core::{
    Absence, BlogConfig, ChatModel, ChatRequest, Extracted, Forge, PullRequest, QuillError,
    ReviewTarget,
};

use crate::progress::Progress;
use crate::{prompt, render};

/// Output budget for a review.
pub const REVIEW_MAX_TOKENS: u32 = 8192;
/// Sampling temperature for a review; low to keep critique objective.
pub const REVIEW_TEMPERATURE: f32 = 0.3;

/// Find the post document changed by `pull` and read it at the head commit.
///
/// Picks the first changed file under the posts root whose name is the post
/// filename. No such file is [`Absence::NoMatchingFile`], not an error.
///
/// # Errors
///
/// Returns [`QuillError::Forge`] if listing or fetching fails.
pub async fn extract_post<F>(
    forge: &F,
    blog: &BlogConfig,
    pull: &PullRequest,
) -> Result<Extracted<ReviewTarget>, QuillError>
where
    F: Forge + ?Sized,
{
    let files = forge.list_pull_files(pull.number).await?;
    let Some(path) = files.into_iter().find(|f| is_post_document(blog, f)) else {
        return Ok(Extracted::Absent(Absence::NoMatchingFile));
    };

    match forge.get_file(&path, Some(&pull.head_sha)).await? {
        Some(content) => Ok(Extracted::Present(ReviewTarget { path, content })),
        None => Ok(Extracted::Absent(Absence::NotFound(path))),
    }
}

/// Ask the model to review `content`, truncated to `max_chars` characters.
///
/// The answer is returned trimmed; the final score is not parsed.
///
/// # Errors
///
/// Returns [`QuillError::Llm`] if the call fails.
pub async fn generate_review<M>(
    model: &M,
    blog: &BlogConfig,
    content: &str,
    max_chars: usize,
) -> Result<String, QuillError>
where
    M: ChatModel + ?Sized,
{
    let excerpt = prompt::truncate_chars(content, max_chars);
    let request = ChatRequest::single(
        prompt::build_review_prompt(blog, excerpt),
        REVIEW_MAX_TOKENS,
        REVIEW_TEMPERATURE,
    );
    let response = model.chat(&request).await?;
    Ok(response.trim().to_string())
}

/// Post `review` of `file_path` as a comment on pull request `number`.
///
/// # Errors
///
/// Returns [`QuillError::Forge`] if the comment cannot be created.
pub async fn post_review<F>(
    forge: &F,
    number: u64,
    file_path: &str,
    review: &str,
) -> Result<(), QuillError>
where
    F: Forge + ?Sized,
{
    forge
        .create_issue_comment(number, &render::review_comment(file_path, review))
        .await
}

/// What a reviewer run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The review was posted on the pull request.
    Posted {
        /// Reviewed file.
        path: String,
        /// Review text.
        review: String,
    },
    /// Dry run: the review was generated but not posted.
    Generated {
        /// Reviewed file.
        path: String,
        /// Review text.
        review: String,
    },
    /// The pull request has no post document to review.
    NothingToReview(Absence),
}

/// Run the whole reviewer pipeline for pull request `number`.
///
/// # Errors
///
/// Propagates the first forge or model failure.
pub async fn run_reviewer<F, M>(
    forge: &F,
    model: &M,
    blog: &BlogConfig,
    number: u64,
    max_chars: usize,
    dry_run: bool,
    progress: &dyn Progress,
) -> Result<ReviewOutcome, QuillError>
where
    F: Forge + ?Sized,
    M: ChatModel + ?Sized,
{
    let pull = forge.get_pull(number).await?;
    progress.done(&format!("PR #{}: {}", pull.number, pull.title));

    progress.stage("Reading post content...");
    let target = match extract_post(forge, blog, &pull).await? {
        Extracted::Present(target) if !target.content.is_empty() => target,
        Extracted::Present(target) => {
            progress.warn(&format!("{} is empty. Aborting.", target.path));
            return Ok(ReviewOutcome::NothingToReview(Absence::NotFound(target.path)));
        }
        Extracted::Absent(reason) => {
            progress.warn(&format!(
                "No {} found in the PR ({reason}). Aborting.",
                blog.post_filename
            ));
            return Ok(ReviewOutcome::NothingToReview(reason));
        }
    };
    progress.done(&format!(
        "{} characters read",
        target.content.chars().count()
    ));

    progress.stage("Sending to the LLM for review...");
    progress.waiting("Waiting for review");
    let review = generate_review(model, blog, &target.content, max_chars).await?;
    progress.done(&format!("{} characters of review generated", review.chars().count()));

    if dry_run {
        return Ok(ReviewOutcome::Generated {
            path: target.path,
            review,
        });
    }

    progress.stage("Posting comment on the PR...");
    post_review(forge, pull.number, &target.path, &review).await?;

    Ok(ReviewOutcome::Posted {
        path: target.path,
        review,
    })
}
