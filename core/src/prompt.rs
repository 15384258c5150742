//! Prompt string helpers.

/// Join prompt fragments with `", "`.
///
/// `build_prompt(&["masterpiece", "best quality", "solo"])` yields
/// `"masterpiece, best quality, solo"`.
pub fn build_prompt<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(", ")
}
