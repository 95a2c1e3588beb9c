use crate::catalog::{SortKey, ALL_CATEGORIES};
use dirs_next::home_dir;
use log::warn;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Browsing preferences remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub sort: SortKey,
    pub category: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sort: SortKey::default(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".libraryhub_settings"))
}

/// Save the preferences to a file in the user's home directory
pub fn save_settings(prefs: &Preferences) -> io::Result<()> {
    match settings_path() {
        Some(path) => save_settings_to(&path, prefs),
        None => Ok(()),
    }
}

pub fn save_settings_to(path: &Path, prefs: &Preferences) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "sort={}", prefs.sort.as_str())?;
    writeln!(file, "category={}", prefs.category)?;
    Ok(())
}

/// Load preferences from the user's home directory
pub fn load_settings() -> (Option<SortKey>, Option<String>) {
    match settings_path() {
        Some(path) if path.exists() => load_settings_from(&path),
        _ => (None, None),
    }
}

/// Unknown keys and unparsable values are skipped.
pub fn load_settings_from(path: &Path) -> (Option<SortKey>, Option<String>) {
    let Ok(content) = fs::read_to_string(path) else {
        return (None, None);
    };

    let mut sort = None;
    let mut category = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("sort=") {
            sort = SortKey::parse(value);
        } else if let Some(value) = line.strip_prefix("category=") {
            let value = value.trim();
            if !value.is_empty() {
                category = Some(value.to_string());
            }
        }
    }

    (sort, category)
}

/// Command line first, then saved preferences, then defaults.
pub fn resolve(
    cli_sort: Option<SortKey>,
    cli_category: Option<String>,
    saved: (Option<SortKey>, Option<String>),
) -> Preferences {
    let defaults = Preferences::default();
    Preferences {
        sort: cli_sort.or(saved.0).unwrap_or(defaults.sort),
        category: cli_category.or(saved.1).unwrap_or(defaults.category),
    }
}

/// An unknown category falls back to all categories.
pub fn with_known_category(prefs: Preferences, categories: &[String]) -> Preferences {
    if categories.contains(&prefs.category) {
        return prefs;
    }
    warn!("ignoring unknown category {:?}", prefs.category);
    Preferences {
        category: ALL_CATEGORIES.to_string(),
        ..prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("libraryhub-settings-{}", std::process::id()));
        let prefs = Preferences {
            sort: SortKey::Rating,
            category: "Science Fiction".to_string(),
        };
        save_settings_to(&path, &prefs).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded, (Some(SortKey::Rating), Some("Science Fiction".to_string())));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_yields_nothing() {
        let path = std::env::temp_dir().join("libraryhub-settings-does-not-exist");
        assert_eq!(load_settings_from(&path), (None, None));
    }

    #[test]
    fn command_line_beats_saved_beats_default() {
        let saved = (Some(SortKey::Price), Some("Romance".to_string()));

        let prefs = resolve(Some(SortKey::Rating), None, saved.clone());
        assert_eq!(prefs.sort, SortKey::Rating);
        assert_eq!(prefs.category, "Romance");

        let prefs = resolve(None, None, (None, None));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn unknown_category_is_not_kept() {
        let categories = crate::catalog::categories(crate::catalog::catalog());
        let prefs = resolve(Some(SortKey::Price), Some("Poetry".to_string()), (None, None));

        let prefs = with_known_category(prefs, &categories);
        assert_eq!(prefs.category, ALL_CATEGORIES);
        assert_eq!(prefs.sort, SortKey::Price);

        let romance = resolve(None, Some("Romance".to_string()), (None, None));
        assert_eq!(with_known_category(romance.clone(), &categories), romance);
    }
}
