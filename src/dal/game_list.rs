use std::{fs, path::Path};

use anyhow::Context;

/// Reads one game title per line, trimmed. Blank lines are skipped.
pub fn load_game_list(game_list_path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(game_list_path)
        .with_context(|| format!("Failed to read game list: {}", game_list_path.display()))?;

    Ok(parse_game_list(&content))
}

pub fn parse_game_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
