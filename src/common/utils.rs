//! Small helpers shared across modules.

use std::path::Path;

/// Display a path with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(relative) = path.strip_prefix(&home)
    {
        return format!("~/{}", relative.display());
    }
    path.display().to_string()
}

/// Cut `text` to at most `width` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
