//! Naming conventions for post directories, files and branches.
//!
//! Posts live at `<posts_dir>/<NNNN>-<slug>/<post_filename>` where `NNNN` is
//! a zero-padded sequence number.

use chrono::NaiveDate;
use quill_core::{BlogConfig, PostMetadata, QuillError};

/// Leading decimal number of a post directory name, if any.
///
/// # Examples
///
/// ```
/// use quill_blog::layout::leading_number;
///
/// assert_eq!(leading_number("0012-traits"), Some(12));
/// assert_eq!(leading_number("drafts"), None);
/// ```
pub fn leading_number(dirname: &str) -> Option<u64> {
    let end = dirname
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(dirname.len(), |(i, _)| i);
    dirname[..end].parse().ok()
}

/// Sequence number for the next post: one past the highest existing number,
/// or `1` when no directory carries a number.
///
/// # Errors
///
/// Returns [`QuillError::Parse`] when the highest number is already `u64::MAX`.
///
/// # Examples
///
/// ```
/// use quill_blog::layout::next_post_number;
/// use quill_core::PostMetadata;
///
/// let posts = vec![
///     PostMetadata::untitled("0001-hello"),
///     PostMetadata::untitled("0004-lifetimes"),
/// ];
/// assert_eq!(next_post_number(&posts).unwrap(), 5);
/// assert_eq!(next_post_number(&[]).unwrap(), 1);
/// ```
pub fn next_post_number(posts: &[PostMetadata]) -> Result<u64, QuillError> {
    let highest = posts
        .iter()
        .filter_map(|p| leading_number(&p.dirname))
        .max()
        .unwrap_or(0);
    highest.checked_add(1).ok_or_else(|| {
        QuillError::Parse(format!("no post number after {highest} is available"))
    })
}

/// Directory name for post `number` with `slug`.
///
/// # Examples
///
/// ```
/// use quill_blog::layout::post_dir_name;
///
/// assert_eq!(post_dir_name(7, "ownership-basics"), "0007-ownership-basics");
/// ```
pub fn post_dir_name(number: u64, slug: &str) -> String {
    format!("{number:04}-{slug}")
}

/// Repository path of the document inside post directory `dirname`.
pub fn post_document_path(blog: &BlogConfig, dirname: &str) -> String {
    format!("{}/{dirname}/{}", blog.posts_dir, blog.post_filename)
}

/// Branch that carries a freshly generated post.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use quill_blog::layout::branch_name;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
/// assert_eq!(branch_name(day, "intro"), "agent/post-20250309-intro");
/// ```
pub fn branch_name(date: NaiveDate, slug: &str) -> String {
    format!("agent/post-{}-{slug}", date.format("%Y%m%d"))
}

/// Whether a changed file in a pull request is a post document.
pub fn is_post_document(blog: &BlogConfig, path: &str) -> bool {
    path.starts_with(&format!("{}/", blog.posts_dir)) && path.ends_with(&blog.post_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts(names: &[&str]) -> Vec<PostMetadata> {
        names.iter().map(|n| PostMetadata::untitled(n)).collect()
    }

    #[test]
    fn next_number_is_max_plus_one() {
        assert_eq!(next_post_number(&posts(&["0003-c", "0001-a", "0010-j"])).unwrap(), 11);
    }

    #[test]
    fn next_number_ignores_gaps_and_order() {
        assert_eq!(next_post_number(&posts(&["0042-x", "0002-y"])).unwrap(), 43);
    }

    #[test]
    fn next_number_without_numbered_dirs_is_one() {
        assert_eq!(next_post_number(&[]).unwrap(), 1);
        assert_eq!(next_post_number(&posts(&["drafts", "about-me"])).unwrap(), 1);
    }

    #[test]
    fn next_number_skips_unnumbered_dirs() {
        assert_eq!(next_post_number(&posts(&["drafts", "0005-e"])).unwrap(), 6);
    }

    #[test]
    fn next_number_rejects_exhausted_sequence() {
        let err = next_post_number(&posts(&["18446744073709551615-huge"])).unwrap_err();
        assert!(matches!(err, QuillError::Parse(_)));
        assert_eq!(
            next_post_number(&posts(&["18446744073709551614-big"])).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn leading_number_edge_cases() {
        assert_eq!(leading_number("12"), Some(12));
        assert_eq!(leading_number(""), None);
        assert_eq!(leading_number("-12"), None);
        assert_eq!(leading_number("v2-post"), None);
    }

    #[test]
    fn dir_name_pads_to_four_digits() {
        assert_eq!(post_dir_name(1, "intro"), "0001-intro");
        assert_eq!(post_dir_name(12345, "big"), "12345-big");
    }

    #[test]
    fn document_path_uses_layout() {
        let blog = BlogConfig::default();
        assert_eq!(
            post_document_path(&blog, "0001-intro"),
            "posts/0001-intro/README.md"
        );
    }

    #[test]
    fn post_document_detection() {
        let blog = BlogConfig::default();
        assert!(is_post_document(&blog, "posts/0001-intro/README.md"));
        assert!(!is_post_document(&blog, "README.md"));
        assert!(!is_post_document(&blog, "postscript/README.md"));
        assert!(!is_post_document(&blog, "posts/0001-intro/cover.png"));
    }
}
