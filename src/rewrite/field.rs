//! Rewriting of fields that hold a single file name.

use std::borrow::Cow;

use crate::asset_paths::{AssetResolver, extract_hash};
use crate::models::{FileMetadataUpdate, TargetMode};

/// Replace a bare file name with its hashed counterpart.
///
/// Empty values and unresolved names are returned borrowed and untouched. The result is always
/// a bare file name; building a URL is left to the caller.
pub fn rewrite_field<'a>(filename: &'a str, resolver: &dyn AssetResolver) -> Cow<'a, str> {
    if filename.is_empty() {
        return Cow::Borrowed(filename);
    }
    match resolver.resolve(filename) {
        Some(hashed) => Cow::Owned(hashed.to_string()),
        None => Cow::Borrowed(filename),
    }
}

/// Derive the new name, url and hash for a file metadata row named `name`.
///
/// Local targets only produce an update when the hashed name differs from `name`.
pub fn rewrite_file_metadata(
    name: &str,
    resolver: &dyn AssetResolver,
    target: &TargetMode,
    uploads_prefix: &str,
) -> Option<FileMetadataUpdate> {
    let hashed = match rewrite_field(name, resolver) {
        Cow::Owned(hashed) => hashed,
        Cow::Borrowed(_) => return None,
    };
    if !target.rewrites_unchanged_names() && hashed == name {
        return None;
    }

    let hash = extract_hash(&hashed)?.to_string();
    Some(FileMetadataUpdate {
        url: target.reference(uploads_prefix, &hashed),
        name: hashed,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_paths::AssetListing;

    fn listing() -> AssetListing {
        AssetListing::from_names(["meet_olli_img_1_e6adf9fe4b.png"])
    }

    #[test]
    fn resolves_bare_file_names() {
        let result = rewrite_field("meet_olli_img_1.png", &listing());
        assert_eq!(result, "meet_olli_img_1_e6adf9fe4b.png");
    }

    #[test]
    fn empty_values_come_back_as_the_same_reference() {
        let empty = String::new();
        let result = rewrite_field(&empty, &listing());

        assert!(matches!(result, Cow::Borrowed(_)));
        assert!(std::ptr::eq(result.as_ptr(), empty.as_ptr()));
    }

    #[test]
    fn unresolved_names_are_borrowed_unchanged() {
        let name = "avatar.jpg";
        let result = rewrite_field(name, &listing());

        assert!(matches!(result, Cow::Borrowed(value) if std::ptr::eq(value, name)));
    }

    #[test]
    fn builds_local_file_metadata_update() {
        let update = rewrite_file_metadata(
            "meet_olli_img_1.png",
            &listing(),
            &TargetMode::Local,
            "/uploads",
        );

        assert_eq!(
            update,
            Some(FileMetadataUpdate {
                name: "meet_olli_img_1_e6adf9fe4b.png".into(),
                url: "/uploads/meet_olli_img_1_e6adf9fe4b.png".into(),
                hash: "e6adf9fe4b".into(),
            })
        );
    }

    #[test]
    fn builds_cloud_file_metadata_update() {
        let target = TargetMode::cloud("https://cdn.example.com/");
        let update = rewrite_file_metadata("meet_olli_img_1.png", &listing(), &target, "/uploads")
            .expect("name should resolve");

        assert_eq!(update.url, "https://cdn.example.com/meet_olli_img_1_e6adf9fe4b.png");
    }

    #[test]
    fn skips_already_hashed_rows() {
        let update = rewrite_file_metadata(
            "meet_olli_img_1_e6adf9fe4b.png",
            &listing(),
            &TargetMode::Local,
            "/uploads",
        );
        assert_eq!(update, None);
    }
}
