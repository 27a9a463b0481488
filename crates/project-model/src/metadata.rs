//! Clip metadata supplied by the caller.

use serde::{Deserialize, Serialize};

/// Title used when the caller supplies none.
pub const DEFAULT_TITLE: &str = "Titre du clip";

/// Broadcaster name used when the caller supplies none.
pub const DEFAULT_BROADCASTER: &str = "Streamer";

/// Descriptive metadata of a source clip.
///
/// Absent fields are substituted with placeholders when read through the
/// accessors; the raw options are kept for pass-through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipMetadata {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub broadcaster_name: Option<String>,

    /// Not used by the layout; carried through for callers.
    #[serde(default)]
    pub game_name: Option<String>,
}

impl ClipMetadata {
    pub fn new(
        title: impl Into<String>,
        broadcaster_name: impl Into<String>,
        game_name: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            broadcaster_name: Some(broadcaster_name.into()),
            game_name: Some(game_name.into()),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn broadcaster_name(&self) -> &str {
        self.broadcaster_name
            .as_deref()
            .unwrap_or(DEFAULT_BROADCASTER)
    }

    pub fn game_name(&self) -> Option<&str> {
        self.game_name.as_deref()
    }

    /// Caption text shown under the composition, e.g. `@Anyme023`.
    pub fn broadcaster_handle(&self) -> String {
        format!("@{}", self.broadcaster_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_substituted() {
        let meta = ClipMetadata::default();
        assert_eq!(meta.title(), DEFAULT_TITLE);
        assert_eq!(meta.broadcaster_handle(), "@Streamer");
        assert!(meta.game_name().is_none());
    }

    #[test]
    fn test_supplied_values_used() {
        let meta = ClipMetadata::new("Clutch 1v5", "Anyme023", "Valorant");
        assert_eq!(meta.title(), "Clutch 1v5");
        assert_eq!(meta.broadcaster_handle(), "@Anyme023");
        assert_eq!(meta.game_name(), Some("Valorant"));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let meta: ClipMetadata = serde_json::from_str(r#"{"game_name": "Valorant"}"#).unwrap();
        assert_eq!(meta.title(), DEFAULT_TITLE);
        assert_eq!(meta.game_name(), Some("Valorant"));
    }
}
