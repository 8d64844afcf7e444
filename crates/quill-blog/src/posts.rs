use quill_core::{BlogConfig, EntryKind, Forge, PostMetadata, QuillError};

use crate::front_matter::{parse_front_matter, FrontMatter};
use crate::layout::post_document_path;

/// Read every published post's metadata from the repository.
///
/// Lists the immediate subdirectories of the posts root and parses the front
/// matter of each one's document. Directories without the document are
/// skipped. A missing posts root is logged and treated as "no posts yet".
/// The result is sorted by directory name, which is numeric order under the
/// zero-padding convention.
///
/// # Errors
///
/// Returns [`QuillError::Forge`] on any forge failure other than a missing
/// path.
pub async fn read_existing_posts<F>(
    forge: &F,
    blog: &BlogConfig,
) -> Result<Vec<PostMetadata>, QuillError>
where
    F: Forge + ?Sized,
{
    let Some(mut entries) = forge.list_dir(&blog.posts_dir).await? else {
        tracing::warn!(
            posts_dir = %blog.posts_dir,
            "posts directory not found, starting from zero"
        );
        return Ok(Vec::new());
    };
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut posts = Vec::new();
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Dir) {
        let path = post_document_path(blog, &entry.name);
        let Some(content) = forge.get_file(&path, None).await? else {
            tracing::debug!(%path, "skipping directory without post document");
            continue;
        };

        let parsed = parse_front_matter(&content);
        if let Some(reason) = parsed.absence() {
            tracing::debug!(%path, %reason, "front matter unavailable, using defaults");
        }
        posts.push(metadata_from_front_matter(
            &entry.name,
            &parsed.unwrap_or_default(),
        ));
    }

    Ok(posts)
}

/// Build [`PostMetadata`] for `dirname`, defaulting missing fields.
///
/// # Examples
///
/// ```
/// use quill_blog::front_matter::FrontMatter;
/// use quill_blog::posts::metadata_from_front_matter;
///
/// let post = metadata_from_front_matter("0002-enums", &FrontMatter::default());
/// assert_eq!(post.title, "0002-enums");
/// assert_eq!(post.description, "");
/// ```
pub fn metadata_from_front_matter(dirname: &str, fm: &FrontMatter) -> PostMetadata {
    PostMetadata {
        dirname: dirname.to_string(),
        title: fm.string("title").unwrap_or_else(|| dirname.to_string()),
        tags: fm.string_list("tags"),
        categories: fm.string_list("categories"),
        description: fm.string("description").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use quill_core::{ContentEntry, NewPullRequest, PullRequest};

    use super::*;

    #[derive(Default)]
    struct DirForge {
        listing: Option<Vec<ContentEntry>>,
        files: HashMap<String, String>,
    }

    fn entry(name: &str, kind: EntryKind) -> ContentEntry {
        ContentEntry {
            name: name.into(),
            path: format!("posts/{name}"),
            kind,
        }
    }

    #[async_trait]
    impl Forge for DirForge {
        fn full_name(&self) -> &str {
            "octocat/blog"
        }

        async fn list_dir(&self, _path: &str) -> Result<Option<Vec<ContentEntry>>, QuillError> {
            Ok(self.listing.clone())
        }

        async fn get_file(
            &self,
            path: &str,
            _reference: Option<&str>,
        ) -> Result<Option<String>, QuillError> {
            Ok(self.files.get(path).cloned())
        }

        async fn branch_sha(&self, _branch: &str) -> Result<String, QuillError> {
            unimplemented!()
        }

        async fn create_ref(&self, _reference: &str, _sha: &str) -> Result<(), QuillError> {
            unimplemented!()
        }

        async fn create_file(
            &self,
            _path: &str,
            _message: &str,
            _content: &str,
            _branch: &str,
        ) -> Result<(), QuillError> {
            unimplemented!()
        }

        async fn create_pull(&self, _pull: &NewPullRequest) -> Result<PullRequest, QuillError> {
            unimplemented!()
        }

        async fn get_pull(&self, _number: u64) -> Result<PullRequest, QuillError> {
            unimplemented!()
        }

        async fn list_pull_files(&self, _number: u64) -> Result<Vec<String>, QuillError> {
            unimplemented!()
        }

        async fn create_issue_comment(&self, _number: u64, _body: &str) -> Result<(), QuillError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn missing_root_means_zero_posts() {
        let forge = DirForge::default();
        let posts = read_existing_posts(&forge, &BlogConfig::default())
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn reads_sorted_metadata_and_skips_gaps() {
        let mut forge = DirForge {
            listing: Some(vec![
                entry("0002-traits", EntryKind::Dir),
                entry("notes.md", EntryKind::File),
                entry("0001-hello", EntryKind::Dir),
                entry("0003-empty", EntryKind::Dir),
            ]),
            ..DirForge::default()
        };
        forge.files.insert(
            "posts/0001-hello/README.md".into(),
            "---\ntitle: Hello\ntags: [intro]\ncategories: [rust]\ndescription: Hi\n---\n".into(),
        );
        forge.files.insert(
            "posts/0002-traits/README.md".into(),
            "# no front matter here".into(),
        );

        let posts = read_existing_posts(&forge, &BlogConfig::default())
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].dirname, "0001-hello");
        assert_eq!(posts[0].title, "Hello");
        assert_eq!(posts[0].tags, vec!["intro"]);
        assert_eq!(posts[0].categories, vec!["rust"]);
        assert_eq!(posts[0].description, "Hi");
        assert_eq!(posts[1], PostMetadata::untitled("0002-traits"));
    }
}
