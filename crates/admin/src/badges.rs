use std::path::Path;

use crate::Result;

/// Badge ids from a plain text list: one per line, blank lines and `#` comments skipped.
pub fn parse_badge_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

pub async fn read_badge_file(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_badge_list(&content))
}
