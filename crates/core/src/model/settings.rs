use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Display and accessibility preferences.
///
/// Keys this build does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    pub theme: Theme,
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
    pub font_size: FontSize,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            sound_enabled: true,
            music_enabled: true,
            high_contrast: false,
            reduced_motion: false,
            font_size: FontSize::Medium,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_pass_through() {
        let json = r#"{"theme":"dark","soundEnabled":false,"mascot":"owl"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.sound_enabled);
        assert!(settings.music_enabled);
        assert_eq!(settings.extra["mascot"], "owl");

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["mascot"], "owl");
        assert_eq!(back["fontSize"], "medium");
    }
}
