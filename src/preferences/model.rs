//! Preference record and personality presets.

use serde::{Deserialize, Serialize};

/// Tone preset that shapes prompt phrasing and theming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PersonalityMode {
    #[default]
    Balanced,
    Strict,
    Zen,
}

impl PersonalityMode {
    pub const ALL: [PersonalityMode; 3] = [Self::Balanced, Self::Strict, Self::Zen];

    /// Stored name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Strict => "Strict",
            Self::Zen => "Zen",
        }
    }

    /// One-line description shown under the mode picker.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Balanced => "Attempts to find a healthy middle ground.",
            Self::Strict => "Takes no excuses. Focuses purely on productivity.",
            Self::Zen => "Focuses on mental health and avoiding burnout.",
        }
    }

    /// Background gradient stops for this mode.
    pub fn theme_colors(&self) -> [&'static str; 2] {
        match self {
            Self::Balanced => ["#111827", "#1a0033"],
            Self::Strict => ["#200505", "#1a0000"],
            Self::Zen => ["#052005", "#001a00"],
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Balanced => "scale-balance",
            Self::Strict => "robot-angry",
            Self::Zen => "meditation",
        }
    }
}

impl std::fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonalityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Self::Balanced),
            "strict" => Ok(Self::Strict),
            "zen" => Ok(Self::Zen),
            other => Err(format!("unknown personality mode '{other}'")),
        }
    }
}

/// Snapshot of every stored preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub personality_mode: PersonalityMode,
    pub custom_instructions: String,
    pub notifications_enabled: bool,
    pub save_history_enabled: bool,
    pub nickname: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            personality_mode: PersonalityMode::Balanced,
            custom_instructions: String::new(),
            notifications_enabled: true,
            save_history_enabled: true,
            nickname: None,
        }
    }
}

/// Store keys. Kept identical to the mobile app's so existing data reads back.
pub mod keys {
    pub const PERSONALITY: &str = "ai_personality";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const CUSTOM_INSTRUCTIONS: &str = "custom_instructions";
    pub const SAVE_HISTORY: &str = "save_history_pref";
    pub const NICKNAME: &str = "user_nickname";
    pub const DECISION_HISTORY: &str = "decision_history";
}
