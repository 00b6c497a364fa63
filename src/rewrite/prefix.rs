//! Blanket replacement of the uploads prefix with an external base URL.

use regex::{Captures, Regex};

use crate::error::RewriteResult;
use crate::models::PrefixRewrite;

use super::text::DEFAULT_UPLOADS_PREFIX;

/// Rewrites every `/uploads/<path>` occurrence without consulting a file listing.
#[derive(Debug, Clone)]
pub struct PrefixRewriter {
    pattern: Regex,
}

impl PrefixRewriter {
    /// Build a rewriter for paths under `uploads_prefix`.
    pub fn new(uploads_prefix: &str) -> RewriteResult<Self> {
        let prefix = uploads_prefix.trim_end_matches('/');
        let pattern = Regex::new(&format!(r#"{}/([^\s)"']+)"#, regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// Move every prefixed path in `text` under `base_url`, counting each match.
    pub fn rewrite(&self, text: &str, base_url: &str) -> PrefixRewrite {
        let mut count = 0;
        let updated = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            format!("{}/{}", base_url.trim_end_matches('/'), &caps[1])
        });

        PrefixRewrite {
            text: updated.into_owned(),
            count,
        }
    }
}

impl Default for PrefixRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOADS_PREFIX).expect("invalid uploads prefix regex")
    }
}

/// Replace every `/uploads/<path>` in `text` with `{base_url}/<path>`.
pub fn rewrite_prefix(text: &str, base_url: &str) -> PrefixRewrite {
    PrefixRewriter::default().rewrite(text, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN: &str = "https://cdn.example.com";

    #[test]
    fn replaces_every_prefixed_path() {
        let result = rewrite_prefix("see /uploads/a.png and /uploads/b.png", CDN);
        assert_eq!(
            result.text,
            "see https://cdn.example.com/a.png and https://cdn.example.com/b.png"
        );
        assert_eq!(result.count, 2);
    }

    #[test]
    fn stops_at_whitespace_quotes_and_parentheses() {
        let text = r#"![x](/uploads/x.png) <img src="/uploads/y.png"> '/uploads/z.png'"#;
        let result = rewrite_prefix(text, CDN);
        assert_eq!(
            result.text,
            r#"![x](https://cdn.example.com/x.png) <img src="https://cdn.example.com/y.png"> 'https://cdn.example.com/z.png'"#
        );
        assert_eq!(result.count, 3);
    }

    #[test]
    fn second_pass_is_stable() {
        let first = rewrite_prefix("/uploads/a.png", CDN);
        assert_eq!(first.text, "https://cdn.example.com/a.png");

        let second = rewrite_prefix(&first.text, CDN);
        assert_eq!(second.text, first.text);
        assert_eq!(second.count, 0);
    }

    #[test]
    fn replaces_prefix_wherever_it_appears() {
        for (text, expected) in [
            ("img/uploads/a.png", "imghttps://cdn.example.com/a.png"),
            ("x_/uploads/a.png", "x_https://cdn.example.com/a.png"),
            (
                "http://localhost:1337/uploads/a.png",
                "http://localhost:1337https://cdn.example.com/a.png",
            ),
        ] {
            let result = rewrite_prefix(text, CDN);
            assert_eq!(result.text, expected);
            assert_eq!(result.count, 1);
        }
    }

    #[test]
    fn leaves_text_without_prefix_unchanged() {
        let result = rewrite_prefix("nothing to see /upload/a.png", CDN);
        assert_eq!(result.text, "nothing to see /upload/a.png");
        assert_eq!(result.count, 0);
    }

    #[test]
    fn ignores_bare_prefix_without_path() {
        let result = rewrite_prefix("dir /uploads/ only", CDN);
        assert_eq!(result.count, 0);
    }
}
