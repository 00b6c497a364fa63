//! Markdown image rewriting against a hashed file listing.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::asset_paths::AssetResolver;
use crate::error::RewriteResult;
use crate::models::{Replacement, TargetMode, TextRewrite};

/// Default prefix under which uploads are referenced.
pub const DEFAULT_UPLOADS_PREFIX: &str = "/uploads";

/// Scanner for `![alt](/uploads/<file>)` images under a configurable prefix.
#[derive(Debug, Clone)]
pub struct MarkdownRewriter {
    prefix: String,
    pattern: Regex,
}

impl MarkdownRewriter {
    /// Build a scanner for references under `uploads_prefix`.
    pub fn new(uploads_prefix: &str) -> RewriteResult<Self> {
        let prefix = uploads_prefix.trim_end_matches('/').to_string();
        let pattern = Regex::new(&format!(
            r"!\[([^\]]*)\]\({}/([^)]+)\)",
            regex::escape(&prefix)
        ))?;
        Ok(Self { prefix, pattern })
    }

    /// Prefix the scanner matches, without a trailing slash.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Rewrite every image whose file resolves against `resolver`.
    ///
    /// Unresolved images are left untouched and are not reported. In local mode an image is
    /// only rewritten when the hashed name differs from the referenced one.
    pub fn rewrite(
        &self,
        body: &str,
        resolver: &dyn AssetResolver,
        target: &TargetMode,
    ) -> TextRewrite {
        let mut replacements = Vec::new();
        let updated = self.pattern.replace_all(body, |caps: &Captures<'_>| {
            let alt = &caps[1];
            let filename = &caps[2];

            match resolver.resolve(filename) {
                Some(hashed) if target.rewrites_unchanged_names() || hashed != filename => {
                    let reference = target.reference(&self.prefix, hashed);
                    let rewritten = format!("![{alt}]({reference})");
                    replacements.push(Replacement {
                        original: format!("{}/{}", self.prefix, filename),
                        target: reference,
                    });
                    rewritten
                }
                _ => caps[0].to_string(),
            }
        });

        TextRewrite {
            body: updated.into_owned(),
            replacements,
        }
    }
}

impl Default for MarkdownRewriter {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOADS_PREFIX).expect("invalid markdown image regex")
    }
}

fn default_rewriter() -> &'static MarkdownRewriter {
    static REWRITER: OnceLock<MarkdownRewriter> = OnceLock::new();
    REWRITER.get_or_init(MarkdownRewriter::default)
}

/// Rewrite `![alt](/uploads/<file>)` images in `body` using the default prefix.
pub fn rewrite_text(body: &str, resolver: &dyn AssetResolver, target: &TargetMode) -> TextRewrite {
    default_rewriter().rewrite(body, resolver, target)
}
