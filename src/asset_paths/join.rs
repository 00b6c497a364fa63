/// Join a base (uploads prefix or media URL) and a file name with exactly one slash.
///
/// Backslashes in the file name are normalised so that names discovered on Windows produce
/// valid references.
pub fn join_reference(base: &str, file_name: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        file_name.replace('\\', "/").trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::join_reference;

    #[test]
    fn joins_prefix_and_file_name() {
        assert_eq!(join_reference("/uploads", "photo_ab.png"), "/uploads/photo_ab.png");
    }

    #[test]
    fn collapses_duplicate_slashes() {
        assert_eq!(
            join_reference("https://cdn.example.com/", "/photo_ab.png"),
            "https://cdn.example.com/photo_ab.png"
        );
    }

    #[test]
    fn normalises_backslashes_from_windows_inputs() {
        assert_eq!(join_reference("/uploads", "nested\\photo.png"), "/uploads/nested/photo.png");
    }
}
