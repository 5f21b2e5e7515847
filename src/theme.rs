//! Presentation theme flag.
//!
//! The active theme is process-wide but never a bare global: views receive a
//! `ThemeFlag` handle at composition time, and the session container applies
//! the profile's preference to it whenever the profile loads or changes.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidArgument(format!(
                "unknown theme '{other}' (expected light or dark)"
            ))),
        }
    }
}

/// Shared handle to the active theme. Cheap to clone; all clones observe the
/// same value.
#[derive(Debug, Clone)]
pub struct ThemeFlag {
    inner: Arc<RwLock<Theme>>,
}

impl ThemeFlag {
    pub fn new(initial: Theme) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replace the active theme.
    pub fn apply(&self, theme: Theme) {
        let mut current = self.inner.write().expect("theme flag poisoned");
        *current = theme;
    }

    pub fn current(&self) -> Theme {
        *self.inner.read().expect("theme flag poisoned")
    }
}

impl Default for ThemeFlag {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_value() {
        let flag = ThemeFlag::new(Theme::Dark);
        let other = flag.clone();
        flag.apply(Theme::Light);
        assert_eq!(other.current(), Theme::Light);
    }
}
