//! Topic & draft generator: propose the next post, draft it, open a pull request.

use chrono::NaiveDate;
use quill_blog::layout::{branch_name, next_post_number, post_dir_name, post_document_path};
use quill_blog::posts::read_existing_posts;
use quill_core::{
    BlogConfig, ChatModel, ChatRequest, Forge, NewPullRequest, PostMetadata, QuillError,
    TopicProposal,
};

use crate::progress::Progress;
use crate::{prompt, render};

/// Output budget for topic selection.
pub const TOPIC_MAX_TOKENS: u32 = 600;
/// Sampling temperature for topic selection.
pub const TOPIC_TEMPERATURE: f32 = 0.7;
/// Output budget for drafting a post.
pub const DRAFT_MAX_TOKENS: u32 = 4096;
/// Sampling temperature for drafting a post.
pub const DRAFT_TEMPERATURE: f32 = 0.75;

/// Ask the model for the next unpublished topic.
///
/// # Errors
///
/// Returns [`QuillError::Llm`] if the call fails, or [`QuillError::Parse`] if
/// the answer is not a JSON topic.
pub async fn choose_next_topic<M>(
    model: &M,
    blog: &BlogConfig,
    posts: &[PostMetadata],
) -> Result<TopicProposal, QuillError>
where
    M: ChatModel + ?Sized,
{
    let request = ChatRequest::single(
        prompt::build_topic_prompt(blog, posts),
        TOPIC_MAX_TOKENS,
        TOPIC_TEMPERATURE,
    );
    let response = model.chat(&request).await?;
    prompt::parse_topic_response(response.trim())
}

/// Ask the model to draft the full post for `topic`.
///
/// The answer is returned trimmed but otherwise untouched; whether it starts
/// with the requested front matter is left to human review.
///
/// # Errors
///
/// Returns [`QuillError::Llm`] if the call fails.
pub async fn generate_post_content<M>(
    model: &M,
    blog: &BlogConfig,
    topic: &TopicProposal,
    posts: &[PostMetadata],
    today: NaiveDate,
) -> Result<String, QuillError>
where
    M: ChatModel + ?Sized,
{
    let request = ChatRequest::single(
        prompt::build_draft_prompt(blog, topic, posts, today),
        DRAFT_MAX_TOKENS,
        DRAFT_TEMPERATURE,
    );
    let response = model.chat(&request).await?;
    Ok(response.trim().to_string())
}

/// Where a new post will be written.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use quill_agent::generator::PostPlan;
/// use quill_core::BlogConfig;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
/// let plan = PostPlan::new(&BlogConfig::default(), 1, "intro", day);
/// assert_eq!(plan.file_path, "posts/0001-intro/README.md");
/// assert_eq!(plan.branch, "agent/post-20250309-intro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPlan {
    /// Sequence number.
    pub number: u64,
    /// Post directory name (`NNNN-slug`).
    pub dirname: String,
    /// Repository path of the post document.
    pub file_path: String,
    /// Branch that will carry the post.
    pub branch: String,
}

impl PostPlan {
    /// Plan post `number` with `slug`, generated on `today`.
    pub fn new(blog: &BlogConfig, number: u64, slug: &str, today: NaiveDate) -> Self {
        let dirname = post_dir_name(number, slug);
        Self {
            number,
            file_path: post_document_path(blog, &dirname),
            branch: branch_name(today, slug),
            dirname,
        }
    }
}

/// Create the branch, commit the post, and open the pull request.
///
/// Steps run in order and stop at the first failure. Earlier steps are not
/// undone, so a failed run can leave an orphan branch behind.
///
/// Returns the pull request URL.
///
/// # Errors
///
/// Returns [`QuillError::Forge`] from whichever step failed.
pub async fn publish_post<F>(
    forge: &F,
    blog: &BlogConfig,
    plan: &PostPlan,
    topic: &TopicProposal,
    content: &str,
    today: NaiveDate,
    progress: &dyn Progress,
) -> Result<String, QuillError>
where
    F: Forge + ?Sized,
{
    let base_sha = forge.branch_sha(&blog.main_branch).await?;

    forge
        .create_ref(&format!("refs/heads/{}", plan.branch), &base_sha)
        .await?;
    progress.done(&format!("Branch created: {}", plan.branch));

    forge
        .create_file(
            &plan.file_path,
            &render::commit_message(&plan.dirname),
            content,
            &plan.branch,
        )
        .await?;
    progress.done(&format!("File created: {}", plan.file_path));

    let pull = NewPullRequest {
        title: render::pull_request_title(topic),
        head: plan.branch.clone(),
        base: blog.main_branch.clone(),
        body: render::pull_request_body(topic, &plan.file_path, today),
        draft: false,
    };
    let created = forge.create_pull(&pull).await?;
    Ok(created.html_url)
}

/// What a generator run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The pull request was opened.
    Published {
        /// Chosen topic.
        topic: TopicProposal,
        /// Where the post was written.
        plan: PostPlan,
        /// Pull request URL.
        pr_url: String,
    },
    /// Dry run: nothing was written to the forge.
    Drafted {
        /// Chosen topic.
        topic: TopicProposal,
        /// Where the post would be written.
        plan: PostPlan,
        /// Generated post.
        content: String,
    },
}

/// Run the whole generator pipeline.
///
/// # Errors
///
/// Propagates the first forge, model or parse failure.
pub async fn run_generator<F, M>(
    forge: &F,
    model: &M,
    blog: &BlogConfig,
    today: NaiveDate,
    dry_run: bool,
    progress: &dyn Progress,
) -> Result<GenerateOutcome, QuillError>
where
    F: Forge + ?Sized,
    M: ChatModel + ?Sized,
{
    progress.stage("Reading existing posts...");
    let posts = read_existing_posts(forge, blog).await?;
    progress.done(&format!("{} post(s) found", posts.len()));
    let number = next_post_number(&posts)?;

    progress.stage("Choosing the next topic...");
    progress.waiting("Waiting for topic proposal");
    let topic = choose_next_topic(model, blog, &posts).await?;
    progress.done(&format!("Topic: {}", topic.title));

    progress.stage("Generating post content...");
    progress.waiting("Drafting post");
    let content = generate_post_content(model, blog, &topic, &posts, today).await?;
    progress.done(&format!("{} characters generated", content.chars().count()));

    let plan = PostPlan::new(blog, number, &topic.slug, today);

    if dry_run {
        return Ok(GenerateOutcome::Drafted {
            topic,
            plan,
            content,
        });
    }

    progress.stage(&format!("Opening pull request for post #{number:04}..."));
    let pr_url = publish_post(forge, blog, &plan, &topic, &content, today, progress).await?;

    Ok(GenerateOutcome::Published {
        topic,
        plan,
        pr_url,
    })
}
