use std::cell::RefCell;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use quill_agent::generator::{run_generator, GenerateOutcome};
use quill_agent::github::GitHubClient;
use quill_agent::llm::LlmClient;
use quill_agent::progress::Progress;
use quill_agent::reviewer::{run_reviewer, ReviewOutcome};
use quill_core::{ChatModel, Forge, Pipeline, QuillConfig};

#[derive(Parser)]
#[command(
    name = "quill",
    version,
    about = "Blog post drafting and review agent",
    long_about = "Quill keeps a GitHub-hosted Rust blog moving.\n\n\
                   It proposes the next post, drafts it with an LLM and opens a pull request,\n\
                   then reviews blog pull requests and comments with a scored critique.\n\n\
                   Examples:\n  \
                     quill generate               Draft the next post and open a PR\n  \
                     quill generate --dry-run     Print the draft without touching GitHub\n  \
                     quill review --pr 12         Review the post added by PR #12\n  \
                     quill init                   Write a default .quill.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .quill.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Propose the next post, draft it and open a pull request
    #[command(long_about = "Propose the next post, draft it and open a pull request.\n\n\
        Reads the published posts, asks the generator model for an unpublished topic,\n\
        drafts the post and commits it to a fresh agent/post-* branch.\n\
        Requires GITHUB_TOKEN, HF_TOKEN and GITHUB_REPOSITORY.")]
    Generate {
        /// Print the draft instead of creating a branch and pull request
        #[arg(long)]
        dry_run: bool,
        /// Generator model (overrides configuration)
        #[arg(long)]
        model: Option<String>,
        /// Target repository as owner/name (overrides GITHUB_REPOSITORY)
        #[arg(long)]
        repo: Option<String>,
    },
    /// Review the post added by a pull request and comment on it
    #[command(long_about = "Review the post added by a pull request and comment on it.\n\n\
        Finds the first changed post document in the PR, sends it to the reviewer\n\
        model and posts the critique as a PR comment. A PR without a post exits\n\
        cleanly. Requires GH_PAT or GITHUB_TOKEN, HF_TOKEN and GITHUB_REPOSITORY.")]
    Review {
        /// Pull request number
        #[arg(long, env = "PR_NUMBER")]
        pr: u64,
        /// Print the review instead of posting it
        #[arg(long)]
        dry_run: bool,
        /// Reviewer model (overrides MODEL_ID and configuration)
        #[arg(long)]
        model: Option<String>,
        /// Target repository as owner/name (overrides GITHUB_REPOSITORY)
        #[arg(long)]
        repo: Option<String>,
    },
    /// Create a default .quill.toml configuration file
    #[command(long_about = "Create a default .quill.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .quill.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Quill Configuration

[blog]
# name = "Desbravando Rust"
# language = "Brazilian Portuguese (PT-BR)"
# posts_dir = "posts"
# post_filename = "README.md"
# main_branch = "main"
# recent_posts = 5
# context = "Replaces the default writer persona sent to the model"

[llm]
# base_url = "https://router.huggingface.co"
# generator_model = "mistralai/Mistral-7B-Instruct-v0.3"
# reviewer_model = "deepseek-ai/DeepSeek-V3-0324"

[review]
# max_content_chars = 12000

[github]
# repository = "owner/blog"
"#;

/// Terminal progress: stage lines on stdout, a spinner on stderr while the
/// model is working.
struct ConsoleProgress {
    spinner: RefCell<Option<ProgressBar>>,
    interactive: bool,
}

impl ConsoleProgress {
    fn new() -> Self {
        Self {
            spinner: RefCell::new(None),
            interactive: std::io::stderr().is_terminal(),
        }
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl Progress for ConsoleProgress {
    fn stage(&self, message: &str) {
        self.clear_spinner();
        println!("\n{message}");
    }

    fn waiting(&self, message: &str) {
        if !self.interactive {
            return;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        *self.spinner.borrow_mut() = Some(pb);
    }

    fn done(&self, message: &str) {
        self.clear_spinner();
        println!("  {message}");
    }

    fn warn(&self, message: &str) {
        self.clear_spinner();
        eprintln!("  {message}");
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<QuillConfig> {
    let config = match path {
        Some(path) => QuillConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".quill.toml");
            if default_path.exists() {
                QuillConfig::from_file(default_path)?
            } else {
                QuillConfig::default()
            }
        }
    };
    Ok(config)
}

fn resolve(
    config: QuillConfig,
    pipeline: Pipeline,
    repo: Option<String>,
) -> QuillConfig {
    let mut config = config.with_env(pipeline, |key| std::env::var(key).ok());
    if let Some(repo) = repo {
        config.github.repository = Some(repo);
    }
    config
}

fn github_client(config: &QuillConfig) -> Result<GitHubClient> {
    let token = config.require_github_token()?;
    let repository = config.require_repository()?;
    Ok(GitHubClient::new(token, repository)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            dry_run,
            model,
            repo,
        } => {
            let mut config = resolve(load_config(cli.config.as_deref())?, Pipeline::Generate, repo);
            if let Some(model) = model {
                config.llm.generator_model = model;
            }

            let forge = github_client(&config)?;
            config.require_llm_key()?;
            let llm = LlmClient::new(&config.llm, config.llm.generator_model.clone())?;
            tracing::debug!(repo = forge.full_name(), model = llm.model(), "starting generator");

            println!("Quill blog agent: generating the next post for {}", config.blog.name);
            let today = chrono::Local::now().date_naive();
            let progress = ConsoleProgress::new();
            let outcome =
                run_generator(&forge, &llm, &config.blog, today, dry_run, &progress).await?;
            drop(progress);

            match outcome {
                GenerateOutcome::Published { topic, pr_url, .. } => {
                    println!("\nPull request opened for \"{}\": {pr_url}", topic.title);
                }
                GenerateOutcome::Drafted {
                    topic,
                    plan,
                    content,
                } => {
                    println!("\nDry run: nothing was written to {}", forge.full_name());
                    println!("Topic:  {}", topic.title);
                    println!("Path:   {}", plan.file_path);
                    println!("Branch: {}\n", plan.branch);
                    println!("{content}");
                }
            }
        }
        Command::Review {
            pr,
            dry_run,
            model,
            repo,
        } => {
            let mut config = resolve(load_config(cli.config.as_deref())?, Pipeline::Review, repo);
            if let Some(model) = model {
                config.llm.reviewer_model = model;
            }

            let forge = github_client(&config)?;
            config.require_llm_key()?;
            let llm = LlmClient::new(&config.llm, config.llm.reviewer_model.clone())?;
            tracing::debug!(
                repo = forge.full_name(),
                model = llm.model(),
                max_chars = config.review.max_content_chars,
                "starting reviewer"
            );

            println!("Quill reviewer: PR #{pr} on {}", forge.full_name());
            let progress = ConsoleProgress::new();
            let outcome = run_reviewer(
                &forge,
                &llm,
                &config.blog,
                pr,
                config.review.max_content_chars,
                dry_run,
                &progress,
            )
            .await?;
            drop(progress);

            match outcome {
                ReviewOutcome::Posted { path, .. } => {
                    println!("\nReview of {path} posted on PR #{pr}");
                }
                ReviewOutcome::Generated { path, review } => {
                    println!("\nDry run: review of {path} (not posted)\n");
                    println!("{review}");
                }
                ReviewOutcome::NothingToReview(reason) => {
                    println!("\nNothing to review: {reason}");
                }
            }
        }
        Command::Init => {
            let path = Path::new(".quill.toml");
            if path.exists() {
                miette::bail!(help = "edit the existing file instead", ".quill.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .quill.toml with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "quill", &mut std::io::stdout());
        }
    }

    Ok(())
}
