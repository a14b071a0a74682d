use pkgrecipe_types::recipe::Requirements;

pub const REQUIRES_DELIMITER: char = ',';

/// Parse a delimited requirement declaration.
///
/// Tokens are trimmed and empty tokens dropped; order and duplicates are kept because the
/// orchestrator's resolver may be order-sensitive. Absent, blank, or token-free input yields
/// `None`. Token syntax is not checked here.
pub fn resolve_requires(input: Option<&str>) -> Option<Requirements> {
    let raw = input?;
    let items = raw
        .split(REQUIRES_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Requirements::new(items)
}
