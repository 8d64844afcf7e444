use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use quill_agent::generator::{run_generator, GenerateOutcome, DRAFT_MAX_TOKENS, TOPIC_MAX_TOKENS};
use quill_agent::reviewer::{run_reviewer, ReviewOutcome, REVIEW_MAX_TOKENS};
use quill_core::{
    Absence, BlogConfig, ChatModel, ChatRequest, ContentEntry, EntryKind, Forge, NewPullRequest,
    PullRequest, QuillError,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ListDir(String),
    GetFile(String, Option<String>),
    BranchSha(String),
    CreateRef(String, String),
    CreateFile {
        path: String,
        message: String,
        content: String,
        branch: String,
    },
    CreatePull(NewPullRequest),
    GetPull(u64),
    ListPullFiles(u64),
    Comment(u64, String),
}

#[derive(Default)]
struct FakeForge {
    listing: Option<Vec<ContentEntry>>,
    files: HashMap<String, String>,
    pull_files: Vec<String>,
    fail_create_file: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeForge {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl Forge for FakeForge {
    fn full_name(&self) -> &str {
        "octocat/blog"
    }

    async fn list_dir(&self, path: &str) -> Result<Option<Vec<ContentEntry>>, QuillError> {
        self.record(Call::ListDir(path.into()));
        Ok(self.listing.clone())
    }

    async fn get_file(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>, QuillError> {
        self.record(Call::GetFile(path.into(), reference.map(str::to_string)));
        Ok(self.files.get(path).cloned())
    }

    async fn branch_sha(&self, branch: &str) -> Result<String, QuillError> {
        self.record(Call::BranchSha(branch.into()));
        Ok("main-tip-sha".into())
    }

    async fn create_ref(&self, reference: &str, sha: &str) -> Result<(), QuillError> {
        self.record(Call::CreateRef(reference.into(), sha.into()));
        Ok(())
    }

    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
    ) -> Result<(), QuillError> {
        self.record(Call::CreateFile {
            path: path.into(),
            message: message.into(),
            content: content.into(),
            branch: branch.into(),
        });
        if self.fail_create_file {
            return Err(QuillError::Forge("file already exists".into()));
        }
        Ok(())
    }

    async fn create_pull(&self, pull: &NewPullRequest) -> Result<PullRequest, QuillError> {
        self.record(Call::CreatePull(pull.clone()));
        Ok(PullRequest {
            number: 42,
            title: pull.title.clone(),
            html_url: "https://github.com/octocat/blog/pull/42".into(),
            head_sha: "head-sha".into(),
        })
    }

    async fn get_pull(&self, number: u64) -> Result<PullRequest, QuillError> {
        self.record(Call::GetPull(number));
        Ok(PullRequest {
            number,
            title: "[Blog Agent] Intro".into(),
            html_url: format!("https://github.com/octocat/blog/pull/{number}"),
            head_sha: "head-sha".into(),
        })
    }

    async fn list_pull_files(&self, number: u64) -> Result<Vec<String>, QuillError> {
        self.record(Call::ListPullFiles(number));
        Ok(self.pull_files.clone())
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), QuillError> {
        self.record(Call::Comment(number, body.into()));
        Ok(())
    }
}

struct FakeModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    fn model(&self) -> &str {
        "fake/model"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, QuillError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QuillError::Llm("no scripted response".into()))
    }
}

const TOPIC_JSON: &str = "```json\n{\"title\": \"Intro\", \"slug\": \"intro\", \"description\": \"First steps\", \"tags\": [\"basics\"]}\n```";
const DRAFT: &str = "\n---\ntitle: \"Intro\"\n---\n\n# Intro\n";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
}

#[tokio::test]
async fn generator_publishes_first_post_from_main_tip() {
    let forge = FakeForge::default();
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    let outcome = run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap();

    let GenerateOutcome::Published { plan, pr_url, .. } = outcome else {
        panic!("expected a published outcome");
    };
    assert_eq!(plan.file_path, "posts/0001-intro/README.md");
    assert_eq!(pr_url, "https://github.com/octocat/blog/pull/42");

    let calls = forge.calls();
    assert!(calls.contains(&Call::BranchSha("main".into())));
    assert!(calls.contains(&Call::CreateRef(
        "refs/heads/agent/post-20250309-intro".into(),
        "main-tip-sha".into()
    )));

    let files: Vec<&Call> = calls
        .iter()
        .filter(|c| matches!(c, Call::CreateFile { .. }))
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(
        files[0],
        &Call::CreateFile {
            path: "posts/0001-intro/README.md".into(),
            message: "feat(blog): add post 0001-intro".into(),
            content: DRAFT.trim().into(),
            branch: "agent/post-20250309-intro".into(),
        }
    );

    let pulls: Vec<&NewPullRequest> = calls
        .iter()
        .filter_map(|c| match c {
            Call::CreatePull(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(pulls.len(), 1);
    assert_eq!(pulls[0].base, "main");
    assert_eq!(pulls[0].head, "agent/post-20250309-intro");
    assert_eq!(pulls[0].title, "[Blog Agent] Intro");
    assert!(!pulls[0].draft);
}

#[tokio::test]
async fn generator_uses_bounded_sampling() {
    let forge = FakeForge::default();
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap();

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].max_tokens, TOPIC_MAX_TOKENS);
    assert_eq!(requests[0].temperature, 0.7);
    assert_eq!(requests[1].max_tokens, DRAFT_MAX_TOKENS);
    assert_eq!(requests[1].temperature, 0.75);
    assert!(requests.iter().all(|r| r.messages.len() == 1));
    assert!(requests[1].messages[0].content.contains("slug: intro"));
}

#[tokio::test]
async fn generator_numbers_after_existing_posts() {
    let mut forge = FakeForge {
        listing: Some(vec![
            ContentEntry {
                name: "0001-hello".into(),
                path: "posts/0001-hello".into(),
                kind: EntryKind::Dir,
            },
            ContentEntry {
                name: "0002-vars".into(),
                path: "posts/0002-vars".into(),
                kind: EntryKind::Dir,
            },
        ]),
        ..FakeForge::default()
    };
    forge.files.insert(
        "posts/0001-hello/README.md".into(),
        "---\ntitle: Hello\ntags: [intro]\n---\n".into(),
    );
    forge.files.insert(
        "posts/0002-vars/README.md".into(),
        "---\ntitle: Variables\ntags: [let, mut]\n---\n".into(),
    );
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    let outcome = run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap();

    let GenerateOutcome::Published { plan, .. } = outcome else {
        panic!("expected a published outcome");
    };
    assert_eq!(plan.dirname, "0003-intro");

    let topic_prompt = &model.requests()[0].messages[0].content;
    assert!(topic_prompt.contains("- [0001-hello] Hello  | tags: intro"));
    assert!(topic_prompt.contains("- [0002-vars] Variables  | tags: let, mut"));
}

#[tokio::test]
async fn generator_refuses_when_post_numbers_are_exhausted() {
    let mut forge = FakeForge {
        listing: Some(vec![ContentEntry {
            name: "18446744073709551615-huge".into(),
            path: "posts/18446744073709551615-huge".into(),
            kind: EntryKind::Dir,
        }]),
        ..FakeForge::default()
    };
    forge.files.insert(
        "posts/18446744073709551615-huge/README.md".into(),
        "---\ntitle: Huge\n---\n".into(),
    );
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    let err = run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Parse(_)));
    assert!(model.requests().is_empty());
    assert_eq!(forge.count(|c| matches!(c, Call::CreateRef(..))), 0);
}

#[tokio::test]
async fn generator_stops_on_non_json_topic() {
    let forge = FakeForge::default();
    let model = FakeModel::new(&["I think you should write about traits!"]);

    let err = run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Parse(_)));
    assert_eq!(model.requests().len(), 1);
    assert_eq!(forge.count(|c| matches!(c, Call::CreateRef(..))), 0);
}

#[tokio::test]
async fn generator_leaves_branch_when_file_creation_fails() {
    let forge = FakeForge {
        fail_create_file: true,
        ..FakeForge::default()
    };
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    let err = run_generator(&forge, &model, &BlogConfig::default(), day(), false, &())
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Forge(_)));
    assert_eq!(forge.count(|c| matches!(c, Call::CreateRef(..))), 1);
    assert_eq!(forge.count(|c| matches!(c, Call::CreatePull(_))), 0);
}

#[tokio::test]
async fn generator_dry_run_writes_nothing() {
    let forge = FakeForge::default();
    let model = FakeModel::new(&[TOPIC_JSON, DRAFT]);

    let outcome = run_generator(&forge, &model, &BlogConfig::default(), day(), true, &())
        .await
        .unwrap();

    assert!(matches!(outcome, GenerateOutcome::Drafted { .. }));
    assert_eq!(
        forge.count(|c| matches!(
            c,
            Call::BranchSha(_) | Call::CreateRef(..) | Call::CreateFile { .. } | Call::CreatePull(_)
        )),
        0
    );
}

#[tokio::test]
async fn reviewer_skips_pull_without_post() {
    let forge = FakeForge {
        pull_files: vec![
            "README.md".into(),
            "scripts/blog_agent.py".into(),
            "posts/0001-intro/cover.png".into(),
        ],
        ..FakeForge::default()
    };
    let model = FakeModel::new(&["unused"]);

    let outcome = run_reviewer(&forge, &model, &BlogConfig::default(), 5, 12_000, false, &())
        .await
        .unwrap();

    assert_eq!(outcome, ReviewOutcome::NothingToReview(Absence::NoMatchingFile));
    assert!(model.requests().is_empty());
    assert_eq!(forge.count(|c| matches!(c, Call::Comment(..))), 0);
}

#[tokio::test]
async fn reviewer_posts_review_of_first_post_at_head() {
    let mut forge = FakeForge {
        pull_files: vec![
            ".github/workflows/review.yml".into(),
            "posts/0003-traits/README.md".into(),
            "posts/0004-other/README.md".into(),
        ],
        ..FakeForge::default()
    };
    forge.files.insert(
        "posts/0003-traits/README.md".into(),
        "---\ntitle: Traits\n---\nbody".into(),
    );
    let model = FakeModel::new(&["  Great post. Score: 9/10  "]);

    let outcome = run_reviewer(&forge, &model, &BlogConfig::default(), 7, 12_000, false, &())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReviewOutcome::Posted {
            path: "posts/0003-traits/README.md".into(),
            review: "Great post. Score: 9/10".into(),
        }
    );
    assert!(forge.calls().contains(&Call::GetFile(
        "posts/0003-traits/README.md".into(),
        Some("head-sha".into())
    )));

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, REVIEW_MAX_TOKENS);
    assert_eq!(requests[0].temperature, 0.3);

    let comments: Vec<Call> = forge
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Comment(..)))
        .collect();
    assert_eq!(comments.len(), 1);
    let Call::Comment(number, body) = &comments[0] else {
        unreachable!()
    };
    assert_eq!(*number, 7);
    assert!(body.contains("`posts/0003-traits/README.md`"));
    assert!(body.contains("Great post. Score: 9/10"));
}

#[tokio::test]
async fn reviewer_truncates_long_posts() {
    let mut forge = FakeForge {
        pull_files: vec!["posts/0001-long/README.md".into()],
        ..FakeForge::default()
    };
    let body = format!("{}{}", "a".repeat(50), "☃".repeat(50));
    forge
        .files
        .insert("posts/0001-long/README.md".into(), body);
    let model = FakeModel::new(&["ok"]);

    run_reviewer(&forge, &model, &BlogConfig::default(), 1, 50, true, &())
        .await
        .unwrap();

    let prompt = &model.requests()[0].messages[0].content;
    assert!(prompt.contains(&"a".repeat(50)));
    assert!(!prompt.contains('☃'));
}

#[tokio::test]
async fn reviewer_dry_run_does_not_comment() {
    let mut forge = FakeForge {
        pull_files: vec!["posts/0001-intro/README.md".into()],
        ..FakeForge::default()
    };
    forge
        .files
        .insert("posts/0001-intro/README.md".into(), "# Intro".into());
    let model = FakeModel::new(&["fine"]);

    let outcome = run_reviewer(&forge, &model, &BlogConfig::default(), 1, 12_000, true, &())
        .await
        .unwrap();

    assert!(matches!(outcome, ReviewOutcome::Generated { .. }));
    assert_eq!(forge.count(|c| matches!(c, Call::Comment(..))), 0);
}
