use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("unknown celebration style: {0}")]
    UnknownCelebrationStyle(String),
}

/// Which theme the user picked. The color tables themselves live with the
/// presentation layer; the choice is just persisted data here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Parses the storage representation.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError::UnknownTheme` for anything unrecognized.
    pub fn parse(value: &str) -> Result<Self, AppSettingsError> {
        match value {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(AppSettingsError::UnknownTheme(other.to_string())),
        }
    }
}

/// The celebration shown when a day's checklist is fully completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CelebrationStyle {
    #[default]
    Confetti,
    Fireworks,
    Balloons,
    Sparkles,
    Random,
}

impl CelebrationStyle {
    /// Every concrete style, i.e. everything `Random` can resolve to.
    pub const CONCRETE: [CelebrationStyle; 4] = [
        CelebrationStyle::Confetti,
        CelebrationStyle::Fireworks,
        CelebrationStyle::Balloons,
        CelebrationStyle::Sparkles,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CelebrationStyle::Confetti => "confetti",
            CelebrationStyle::Fireworks => "fireworks",
            CelebrationStyle::Balloons => "balloons",
            CelebrationStyle::Sparkles => "sparkles",
            CelebrationStyle::Random => "random",
        }
    }

    /// Parses the storage representation.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError::UnknownCelebrationStyle` for anything
    /// unrecognized.
    pub fn parse(value: &str) -> Result<Self, AppSettingsError> {
        match value {
            "confetti" => Ok(CelebrationStyle::Confetti),
            "fireworks" => Ok(CelebrationStyle::Fireworks),
            "balloons" => Ok(CelebrationStyle::Balloons),
            "sparkles" => Ok(CelebrationStyle::Sparkles),
            "random" => Ok(CelebrationStyle::Random),
            other => Err(AppSettingsError::UnknownCelebrationStyle(other.to_string())),
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    theme: ThemeMode,
    celebration_style: CelebrationStyle,
    celebration_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            celebration_style: CelebrationStyle::Confetti,
            celebration_enabled: true,
        }
    }
}

impl AppSettings {
    #[must_use]
    pub fn new(
        theme: ThemeMode,
        celebration_style: CelebrationStyle,
        celebration_enabled: bool,
    ) -> Self {
        Self {
            theme,
            celebration_style,
            celebration_enabled,
        }
    }

    /// Rehydrates settings from their storage strings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if either string is unrecognized.
    pub fn from_persisted(
        theme: &str,
        celebration_style: &str,
        celebration_enabled: bool,
    ) -> Result<Self, AppSettingsError> {
        Ok(Self {
            theme: ThemeMode::parse(theme)?,
            celebration_style: CelebrationStyle::parse(celebration_style)?,
            celebration_enabled,
        })
    }

    #[must_use]
    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    #[must_use]
    pub fn celebration_style(&self) -> CelebrationStyle {
        self.celebration_style
    }

    #[must_use]
    pub fn celebration_enabled(&self) -> bool {
        self.celebration_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_celebrate_with_confetti_on_system_theme() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme(), ThemeMode::System);
        assert_eq!(settings.celebration_style(), CelebrationStyle::Confetti);
        assert!(settings.celebration_enabled());
    }

    #[test]
    fn settings_round_trip_through_storage_strings() {
        let settings =
            AppSettings::new(ThemeMode::Dark, CelebrationStyle::Random, true);
        let back = AppSettings::from_persisted(
            settings.theme().as_str(),
            settings.celebration_style().as_str(),
            settings.celebration_enabled(),
        )
        .unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn unknown_strings_are_rejected() {
        let err = ThemeMode::parse("solarized").unwrap_err();
        assert_eq!(err, AppSettingsError::UnknownTheme("solarized".into()));
    }
}
