//! core::vibes
//!
//! The vibe catalog: mood tags offered when committing.
//!
//! # Custom Vibes
//!
//! Extra vibes can be loaded from a JSON file:
//!
//! ```json
//! {
//!   "vibes": [
//!     { "emoji": "🚀", "description": "Performance improvements" },
//!     { "emoji": "🎨", "description": "UI/UX changes", "hint": "Pixels moved." }
//!   ]
//! }
//! ```
//!
//! Custom vibes are appended after the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading custom vibes.
#[derive(Debug, Error)]
pub enum VibeError {
    #[error("failed to read vibes file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse vibes file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid vibes file '{path}': {message}")]
    Invalid { path: PathBuf, message: String },
}

/// A mood tag: the label goes into the commit message, the hint is shown
/// next to it in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vibe {
    pub label: String,
    pub hint: String,
}

impl Vibe {
    pub fn new(label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: hint.into(),
        }
    }
}

const DEFAULT_VIBES: [(&str, &str); 6] = [
    ("😌 Feelin Confident", "This commit is rock solid."),
    ("🤞 Feelin Hopeful", "I think this will work..."),
    ("🤔 Feelin Uncertain", "Not sure if this is right."),
    ("😬 Feelin Nervous", "Please don’t break production."),
    ("🔥 Feelin Rushed", "Had to push this quickly!"),
    ("💀 Feelin Desperate", "It works, but I don’t know why."),
];

/// Ordered list of vibes offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibeCatalog {
    vibes: Vec<Vibe>,
}

impl Default for VibeCatalog {
    fn default() -> Self {
        Self {
            vibes: DEFAULT_VIBES
                .iter()
                .map(|(label, hint)| Vibe::new(*label, *hint))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomVibesFile {
    vibes: Vec<CustomVibe>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomVibe {
    emoji: String,
    description: String,
    #[serde(default)]
    hint: Option<String>,
}

impl VibeCatalog {
    /// Parse a custom vibes file into a list of vibes.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, if `vibes` is empty, or
    /// if any entry has an empty emoji or description.
    pub fn load_custom(path: &Path) -> Result<Vec<Vibe>, VibeError> {
        let contents = fs::read_to_string(path).map_err(|e| VibeError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: CustomVibesFile =
            serde_json::from_str(&contents).map_err(|e| VibeError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if file.vibes.is_empty() {
            return Err(VibeError::Invalid {
                path: path.to_path_buf(),
                message: "\"vibes\" must contain at least one entry".to_string(),
            });
        }

        file.vibes
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let emoji = v.emoji.trim();
                let description = v.description.trim();
                if emoji.is_empty() || description.is_empty() {
                    return Err(VibeError::Invalid {
                        path: path.to_path_buf(),
                        message: format!("entry {} needs both an emoji and a description", i + 1),
                    });
                }
                let hint = v
                    .hint
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| description.to_string());
                Ok(Vibe::new(format!("{} {}", emoji, description), hint))
            })
            .collect()
    }

    /// Append vibes after the existing ones, skipping duplicate labels.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = Vibe>) {
        for vibe in extra {
            if !self.vibes.iter().any(|v| v.label == vibe.label) {
                self.vibes.push(vibe);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vibe> {
        self.vibes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Vibe> {
        self.vibes.get(index)
    }

    pub fn len(&self) -> usize {
        self.vibes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vibes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(temp: &TempDir, contents: &str) -> PathBuf {
        let path = temp.path().join("vibes.json");
        fs::write(&path, contents).expect("write vibes file");
        path
    }

    #[test]
    fn default_catalog_has_six_vibes_in_order() {
        let catalog = VibeCatalog::default();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get(0).unwrap().label, "😌 Feelin Confident");
        assert_eq!(catalog.get(5).unwrap().label, "💀 Feelin Desperate");
        assert_eq!(catalog.get(3).unwrap().hint, "Please don’t break production.");
    }

    #[test]
    fn custom_vibes_appended_after_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            r#"{"vibes":[{"emoji":"🚀","description":"Performance improvements"},
                         {"emoji":"🎨","description":"UI/UX changes","hint":"Pixels moved."}]}"#,
        );

        let mut catalog = VibeCatalog::default();
        catalog.extend(VibeCatalog::load_custom(&path).unwrap());

        assert_eq!(catalog.len(), 8);
        let rocket = catalog.get(6).unwrap();
        assert_eq!(rocket.label, "🚀 Performance improvements");
        assert_eq!(rocket.hint, "Performance improvements");
        assert_eq!(catalog.get(7).unwrap().hint, "Pixels moved.");
    }

    #[test]
    fn duplicate_labels_are_skipped() {
        let mut catalog = VibeCatalog::default();
        catalog.extend([Vibe::new("🔥 Feelin Rushed", "again")]);
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn empty_list_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, r#"{"vibes":[]}"#);
        assert!(matches!(
            VibeCatalog::load_custom(&path),
            Err(VibeError::Invalid { .. })
        ));
    }

    #[test]
    fn blank_emoji_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, r#"{"vibes":[{"emoji":" ","description":"x"}]}"#);
        let err = VibeCatalog::load_custom(&path).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn malformed_json_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, r#"{"vibes": ["#);
        assert!(matches!(
            VibeCatalog::load_custom(&path),
            Err(VibeError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = VibeCatalog::load_custom(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
