//! Markdown posted to the forge: pull request bodies and review comments.

use chrono::NaiveDate;
use quill_core::TopicProposal;

/// Title of the pull request carrying a generated post.
pub fn pull_request_title(topic: &TopicProposal) -> String {
    format!("[Blog Agent] {}", topic.title)
}

/// Commit message for the file holding post `dirname`.
pub fn commit_message(dirname: &str) -> String {
    format!("feat(blog): add post {dirname}")
}

/// Body of the pull request carrying a generated post.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use quill_agent::render::pull_request_body;
/// use quill_core::TopicProposal;
///
/// let topic = TopicProposal {
///     title: "Intro".into(),
///     slug: "intro".into(),
///     description: "First steps".into(),
///     tags: vec!["basics".into()],
///     categories: vec!["rust".into()],
///     outline: vec![],
/// };
/// let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
/// let body = pull_request_body(&topic, "posts/0001-intro/README.md", day);
/// assert!(body.contains("| **Generated on** | 09/03/2025 |"));
/// ```
pub fn pull_request_body(topic: &TopicProposal, file_path: &str, today: NaiveDate) -> String {
    let tags = topic
        .tags
        .iter()
        .map(|t| format!("`{t}`"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "## \u{1f916} Post generated automatically by the Blog Agent\n\n\
         | Field | Value |\n\
         |-------|-------|\n\
         | **Title** | {title} |\n\
         | **File** | `{file_path}` |\n\
         | **Tags** | {tags} |\n\
         | **Generated on** | {date} |\n\n\
         ### \u{1f4dd} Description\n\
         {description}\n\n\
         ---\n\
         > \u{26a0}\u{fe0f} **Review required before merging:**\n\
         > - [ ] Technical accuracy of the Rust content\n\
         > - [ ] Code examples compile\n\
         > - [ ] Language suits the target audience\n\
         > - [ ] Front matter is correct (tags, slug, date)\n",
        title = topic.title,
        date = today.format("%d/%m/%Y"),
        description = topic.description,
    )
}

/// Pull request comment wrapping a model review of `file_path`.
///
/// # Examples
///
/// ```
/// use quill_agent::render::review_comment;
///
/// let body = review_comment("posts/0001-intro/README.md", "Score: 8/10");
/// assert!(body.contains("`posts/0001-intro/README.md`"));
/// assert!(body.contains("Score: 8/10"));
/// ```
pub fn review_comment(file_path: &str, review: &str) -> String {
    format!(
        "## \u{1f916} Automatic Post Review\n\n\
         **File:** `{file_path}`\n\n\
         ---\n\n\
         {review}\n\n\
         ---\n\
         *Review generated automatically. Accept or ignore the suggestions at your discretion.*\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> TopicProposal {
        TopicProposal {
            title: "Traits".into(),
            slug: "traits".into(),
            description: "Shared behaviour".into(),
            tags: vec!["traits".into(), "generics".into()],
            categories: vec!["rust".into()],
            outline: vec![],
        }
    }

    #[test]
    fn body_tabulates_topic() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let body = pull_request_body(&topic(), "posts/0004-traits/README.md", day);
        assert!(body.contains("| **Title** | Traits |"));
        assert!(body.contains("| **File** | `posts/0004-traits/README.md` |"));
        assert!(body.contains("| **Tags** | `traits`, `generics` |"));
        assert!(body.contains("| **Generated on** | 25/12/2024 |"));
        assert!(body.contains("### \u{1f4dd} Description\nShared behaviour"));
        assert_eq!(body.matches("- [ ]").count(), 4);
    }

    #[test]
    fn title_and_commit_message() {
        assert_eq!(pull_request_title(&topic()), "[Blog Agent] Traits");
        assert_eq!(commit_message("0004-traits"), "feat(blog): add post 0004-traits");
    }

    #[test]
    fn comment_wraps_review_between_rules() {
        let body = review_comment("posts/x/README.md", "Looks good.");
        assert!(body.starts_with("## \u{1f916} Automatic Post Review"));
        assert!(body.contains("---\n\nLooks good.\n\n---\n"));
    }
}
