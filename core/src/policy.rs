//! Per-request authentication-failure policy.

use std::fmt;

/// Controls how a soft unauthorized result is treated.
///
/// A soft unauthorized result is a successful transport response whose
/// envelope carries [`UNAUTHORIZED_CODE`](crate::UNAUTHORIZED_CODE). Hard
/// transport-level 401s tear the session down regardless of this tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthFailPolicy {
    /// Surface the result as an ordinary business error.
    #[default]
    None,
    /// Tear the session down and classify as unauthorized.
    Logout,
}

impl AuthFailPolicy {
    /// Parse a wire tag. Unrecognized tags map to [`AuthFailPolicy::None`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("logout") {
            Self::Logout
        } else {
            Self::None
        }
    }

    /// The wire tag.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Logout => "logout",
        }
    }

    /// Whether a soft unauthorized result ends the session.
    #[must_use]
    pub const fn logs_out(self) -> bool {
        matches!(self, Self::Logout)
    }
}

impl From<Option<&str>> for AuthFailPolicy {
    fn from(tag: Option<&str>) -> Self {
        tag.map_or(Self::None, Self::from_tag)
    }
}

impl fmt::Display for AuthFailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_tags() {
        assert_eq!(AuthFailPolicy::from_tag("logout"), AuthFailPolicy::Logout);
        assert_eq!(AuthFailPolicy::from_tag("none"), AuthFailPolicy::None);
    }

    #[test]
    fn test_unknown_or_missing_tags_default_to_none() {
        assert_eq!(AuthFailPolicy::from_tag("redirect"), AuthFailPolicy::None);
        assert_eq!(AuthFailPolicy::from_tag(""), AuthFailPolicy::None);
        assert_eq!(AuthFailPolicy::from(None), AuthFailPolicy::None);
        assert_eq!(AuthFailPolicy::default(), AuthFailPolicy::None);
    }
}
