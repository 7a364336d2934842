// Cache schema version handling.
// One ordered version triple backs every "is the stored cache older" decision.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::StarpickError;

/// Semantic version of the on-disk cache format, ordered by
/// (major, minor, patch).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

static CURRENT: LazyLock<SchemaVersion> = LazyLock::new(|| {
    env!("CARGO_PKG_VERSION")
        .parse()
        .expect("package version must be a major.minor.patch triple")
});

impl SchemaVersion {
    /// The schema version produced by this build.
    pub fn current() -> Self {
        *CURRENT
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = StarpickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| StarpickError::InvalidVersion(s.to_string()))
        };
        Ok(Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        })
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = StarpickError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(v: SchemaVersion) -> Self {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u32, minor: u32, patch: u32) -> SchemaVersion {
        SchemaVersion {
            major,
            minor,
            patch,
        }
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let version: SchemaVersion = "1.2.0".parse().unwrap();
        assert_eq!(version, v(1, 2, 0));
        assert_eq!(version.to_string(), "1.2.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1.2".parse::<SchemaVersion>().is_err());
        assert!("a.b.c".parse::<SchemaVersion>().is_err());
        assert!("".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(v(1, 0, 0) > v(0, 9, 9));
        assert!(v(1, 2, 0) > v(1, 1, 9));
        assert!(v(1, 2, 1) > v(1, 2, 0));
        assert_eq!(v(1, 2, 0), v(1, 2, 0));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v(1, 2, 0)).unwrap();
        assert_eq!(json, r#""1.2.0""#);
        let back: SchemaVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v(1, 2, 0));
    }

    #[test]
    fn test_current_matches_package_version() {
        assert_eq!(
            SchemaVersion::current().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }
}
