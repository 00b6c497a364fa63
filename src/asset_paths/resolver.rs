use tracing::warn;

/// Anything that can map an original upload name to its hashed counterpart.
pub trait AssetResolver {
    /// Return the hashed file name for `original_filename`, or `None` when nothing matches.
    fn resolve<'a>(&'a self, original_filename: &str) -> Option<&'a str>;
}

/// Split a file name into its base name and extension (including the dot).
///
/// A leading dot does not start an extension, so `.env` has no extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 => file_name.split_at(index),
        _ => (file_name, ""),
    }
}

/// Final path component of a reference such as `nested/photo.png`.
fn file_name_component(reference: &str) -> &str {
    reference
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(reference)
}

/// Whether `candidate` is `{base}_{hex}{ext}` for the given split original name.
fn is_hashed_variant(base_name: &str, extension: &str, candidate: &str) -> bool {
    candidate
        .strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(extension))
        .is_some_and(|hash| !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the first candidate that is a hashed variant of `original_filename`.
///
/// A candidate matches when it is the original base name, an underscore, a non-empty run of
/// hex digits and the original extension, exactly. Candidates are checked in the order given. When several match, the first one wins and the
/// others are reported as a warning.
pub fn resolve_hashed<'a, S: AsRef<str>>(
    original_filename: &str,
    candidates: &'a [S],
) -> Option<&'a str> {
    let file_name = file_name_component(original_filename);
    if file_name.is_empty() {
        return None;
    }

    let (base_name, extension) = split_extension(file_name);
    let mut matches = candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| is_hashed_variant(base_name, extension, candidate));

    let first = matches.next()?;
    let ignored: Vec<&str> = matches.collect();
    if !ignored.is_empty() {
        warn!(
            original = original_filename,
            chosen = first,
            ?ignored,
            "multiple hashed files match; using the first"
        );
    }
    Some(first)
}

/// Extract the hex token from a hashed file name, e.g. `e6adf9fe4b` from `img_e6adf9fe4b.png`.
pub fn extract_hash(hashed_filename: &str) -> Option<&str> {
    let (base_name, _) = split_extension(file_name_component(hashed_filename));
    let (_, token) = base_name.rsplit_once('_')?;
    (!token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())).then_some(token)
}
