//! Default configuration file generation.
//!
//! The default file is assembled with [`ConfigBuilder`], which aligns the
//! trailing comments of every setting so the generated file stays readable
//! when constants change.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::default_user_agent;
use crate::common::constants::*;

/// Write a commented default configuration to `path`.
///
/// Coordinates are left out; they are only needed for the fixed provider.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = ConfigBuilder::new()
        .add_section("Search")
        .add_setting(
            "endpoint",
            &format!("\"{DEFAULT_ENDPOINT}\""),
            "Nominatim-compatible search endpoint",
        )
        .add_setting(
            "user_agent",
            &format!("\"{}\"", default_user_agent()),
            "Identifies this client to the search service",
        )
        .add_setting(
            "result_limit",
            &DEFAULT_RESULT_LIMIT.to_string(),
            &format!("Facilities per search ({MINIMUM_RESULT_LIMIT}-{MAXIMUM_RESULT_LIMIT})"),
        )
        .add_section("Location")
        .add_setting(
            "location_provider",
            "\"auto\"",
            "Select: \"auto\", \"geoclue\" or \"fixed\"",
        )
        .add_setting(
            "high_accuracy",
            &DEFAULT_HIGH_ACCURACY.to_string(),
            "Request an exact fix instead of street level",
        )
        .add_setting(
            "acquire_timeout_ms",
            &DEFAULT_ACQUIRE_TIMEOUT_MS.to_string(),
            &format!(
                "Single fix timeout ({MINIMUM_ACQUIRE_TIMEOUT_MS}-{MAXIMUM_ACQUIRE_TIMEOUT_MS})ms"
            ),
        )
        .add_setting(
            "follow_device",
            &DEFAULT_FOLLOW_DEVICE.to_string(),
            "Keep watching the device position while signed in",
        )
        .build();

    fs::write(path, content).context("Failed to write default config file")?;
    Ok(())
}

/// Builds TOML text with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                Entry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_aligns_comments() {
        let text = ConfigBuilder::new()
            .add_section("A")
            .add_setting("x", "1", "short")
            .add_setting("longer_key", "\"value\"", "long")
            .add_section("B")
            .add_setting("y", "true", "last")
            .build();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#[A]");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "#[B]");

        let columns: Vec<usize> = lines
            .iter()
            .filter(|l| !l.starts_with("#[") && !l.is_empty())
            .map(|l| l.find('#').unwrap())
            .collect();
        assert!(columns.windows(2).all(|w| w[0] == w[1]));
    }
}
