use std::fmt;

use serde::Deserialize;

/// Which wallpaper surface(s) a request updates.
///
/// Wire values follow the platform flags: `1` home screen, `2` lock screen,
/// `3` both. Config files name them `home`, `lock` and `both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Home,
    Lock,
    #[default]
    Both,
}

impl Placement {
    /// Platform flag value.
    #[must_use]
    pub const fn flags(self) -> u32 {
        match self {
            Self::Home => 1,
            Self::Lock => 2,
            Self::Both => 3,
        }
    }

    #[must_use]
    pub const fn from_flags(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Self::Home),
            2 => Some(Self::Lock),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    /// Like [`Placement::from_flags`], substituting [`Placement::Both`] for
    /// anything out of range.
    #[must_use]
    pub fn from_flags_or_default(raw: i64) -> Self {
        Self::from_flags(raw).unwrap_or_default()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "home",
            Self::Lock => "lock",
            Self::Both => "both",
        })
    }
}
