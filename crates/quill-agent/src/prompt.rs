use chrono::NaiveDate;
use quill_core::{BlogConfig, PostMetadata, QuillError, TopicProposal};

const TOPIC_SCHEMA: &str = r#"{
  "title": "Post title",
  "slug": "short-kebab-case-slug",
  "description": "One sentence describing the post",
  "tags": ["tag1", "tag2", "tag3"],
  "categories": ["rust"],
  "outline": [
    "Introduction: ...",
    "Section 1: ...",
    "Section 2: ...",
    "Comparison with Python: ...",
    "Conclusion: ..."
  ]
}"#;

const WRITING_RULES: &str = "\
1. Accessible language for readers with little Rust background
2. Include ```rust blocks with comments explaining each part
3. Compare with Python (```python) whenever it helps understanding
4. Organise the post with subheadings (##, ###)
5. Open with an engaging introduction and close with a conclusion summarising what was learned
6. Use emojis sparingly to keep the tone friendly
7. Go deep enough to be useful without becoming excessively long";

/// Build the prompt asking the model for the next unpublished topic.
///
/// # Examples
///
/// ```
/// use quill_agent::prompt::build_topic_prompt;
/// use quill_core::{BlogConfig, PostMetadata};
///
/// let prompt = build_topic_prompt(&BlogConfig::default(), &[PostMetadata::untitled("0001-hello")]);
/// assert!(prompt.contains("- [0001-hello] 0001-hello"));
/// assert!(prompt.contains("\"slug\""));
/// ```
pub fn build_topic_prompt(blog: &BlogConfig, posts: &[PostMetadata]) -> String {
    let topics = if posts.is_empty() {
        "No posts published yet.".to_string()
    } else {
        posts
            .iter()
            .map(|p| format!("- [{}] {}  | tags: {}", p.dirname, p.title, p.tags.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{persona}\n\n\
         ## Posts already published:\n\
         {topics}\n\n\
         ## Your task:\n\
         Suggest the NEXT post. The topic must:\n\
         - NOT repeat any of the topics above\n\
         - Follow a logical Rust learning progression for someone coming from Python\n\
         - Be specific enough for a focused post\n\n\
         Answer ONLY with valid JSON, without markdown code blocks, using {language} for the text fields:\n\
         {TOPIC_SCHEMA}\n",
        persona = blog.persona(),
        language = blog.language,
    )
}

/// Build the prompt asking the model to draft the full post for `topic`.
///
/// Only the `blog.recent_posts` most recent titles are included.
pub fn build_draft_prompt(
    blog: &BlogConfig,
    topic: &TopicProposal,
    posts: &[PostMetadata],
    today: NaiveDate,
) -> String {
    let recent_start = posts.len().saturating_sub(blog.recent_posts);
    let recent = &posts[recent_start..];
    let recent_titles = if recent.is_empty() {
        "None yet.".to_string()
    } else {
        recent
            .iter()
            .map(|p| format!("- {}", p.title))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let outline = topic
        .outline
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{persona}\n\n\
         ## Context (latest published posts):\n\
         {recent_titles}\n\n\
         ## Post to write:\n\
         Title: {title}\n\
         Slug: {slug}\n\
         Description: {description}\n\
         Tags: {tags}\n\n\
         Suggested outline:\n\
         {outline}\n\n\
         ## Writing rules:\n\
         {WRITING_RULES}\n\n\
         ## Output format:\n\
         Produce ONLY the markdown content, which must start with this front matter:\n\n\
         {front_matter}\n\n\
         Write the complete post below the front matter.\n",
        persona = blog.persona(),
        title = topic.title,
        slug = topic.slug,
        description = topic.description,
        tags = topic.tags.join(", "),
        front_matter = front_matter_template(topic, today),
    )
}

/// The literal front matter block a drafted post must begin with.
///
/// Tags and categories are JSON arrays with `", "` separators.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use quill_agent::prompt::front_matter_template;
/// use quill_core::TopicProposal;
///
/// let topic = TopicProposal {
///     title: "Intro".into(),
///     slug: "intro".into(),
///     description: "Hello".into(),
///     tags: vec!["básico".into()],
///     categories: vec!["rust".into()],
///     outline: vec![],
/// };
/// let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let block = front_matter_template(&topic, day);
/// assert!(block.contains("date: 2025-01-02"));
/// assert!(block.contains(r#"tags: ["básico"]"#));
/// ```
pub fn front_matter_template(topic: &TopicProposal, today: NaiveDate) -> String {
    format!(
        "---\n\
         title: \"{title}\"\n\
         date: {date}\n\
         slug: {slug}\n\
         tags: {tags}\n\
         categories: {categories}\n\
         description: \"{description}\"\n\
         draft: false\n\
         ---",
        title = topic.title,
        date = today.format("%Y-%m-%d"),
        slug = topic.slug,
        tags = json_list(&topic.tags),
        categories = json_list(&topic.categories),
        description = topic.description,
    )
}

fn json_list(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| serde_json::Value::from(item.as_str()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Build the review prompt for `content`, which the caller has already truncated.
///
/// # Examples
///
/// ```
/// use quill_agent::prompt::build_review_prompt;
/// use quill_core::BlogConfig;
///
/// let prompt = build_review_prompt(&BlogConfig::default(), "# Post");
/// assert!(prompt.contains("# Post"));
/// assert!(prompt.contains("1 to 10"));
/// ```
pub fn build_review_prompt(blog: &BlogConfig, content: &str) -> String {
    format!(
        "You are a technical reviewer specialised in Rust and Python.\n\
         Review the post below, written for the blog '{name}', aimed at\n\
         Python programmers who are learning Rust.\n\n\
         ## Post to review:\n\
         {content}\n\n\
         ## What to assess and correct:\n\n\
         ### \u{2705} Technical Accuracy\n\
         - Are the Rust code examples correct, and would they compile without errors?\n\
         - Are the Rust concepts explained correctly?\n\
         - Are the comparisons with Python accurate and fair?\n\n\
         ### \u{1f4d6} Pedagogy and Clarity\n\
         - Is the progression of the content logical for a Rust beginner?\n\
         - Is any concept introduced without adequate explanation?\n\
         - Do the analogies and examples help understanding?\n\n\
         ### \u{1f5e3}\u{fe0f} Language\n\
         - Is the {language} correct and natural?\n\
         - Is the tone accessible (neither too technical nor too basic)?\n\n\
         ### \u{1f527} Improvement Suggestions\n\
         - Which sections could be expanded?\n\
         - Is an important code example missing?\n\
         - Is there anything that would especially confuse someone coming from Python?\n\n\
         ## Review format:\n\
         Structure your answer in sections with the headings above, written in {language}.\n\
         For every problem found, quote the specific passage and suggest the fix.\n\
         Be objective and constructive. Finish with an overall score from 1 to 10.\n",
        name = blog.name,
        language = blog.language,
    )
}

/// The first `max_chars` characters of `content`.
///
/// # Examples
///
/// ```
/// use quill_agent::prompt::truncate_chars;
///
/// assert_eq!(truncate_chars("ação", 2), "aç");
/// assert_eq!(truncate_chars("abc", 10), "abc");
/// ```
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// Strip an optional markdown code fence around a model answer.
///
/// The opening fence may carry a language tag (```` ```json ````). Either
/// fence may be missing.
///
/// # Examples
///
/// ```
/// use quill_agent::prompt::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
/// assert_eq!(strip_code_fences("{}"), "{}");
/// ```
pub fn strip_code_fences(s: &str) -> &str {
    let mut body = s.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let tag_end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        body = &rest[tag_end..];
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Decode the model's topic answer.
///
/// # Errors
///
/// Returns [`QuillError::Parse`] if the answer is not a JSON topic after
/// stripping code fences. There is no repair attempt.
///
/// # Examples
///
/// ```
/// use quill_agent::prompt::parse_topic_response;
///
/// let raw = "```json\n{\"title\":\"T\",\"slug\":\"t\",\"description\":\"d\",\"tags\":[]}\n```";
/// assert_eq!(parse_topic_response(raw).unwrap().slug, "t");
/// assert!(parse_topic_response("Sure! Here is a topic").is_err());
/// ```
pub fn parse_topic_response(response: &str) -> Result<TopicProposal, QuillError> {
    let cleaned = strip_code_fences(response);
    serde_json::from_str(cleaned)
        .map_err(|e| QuillError::Parse(format!("topic response is not valid JSON: {e}")))
}
