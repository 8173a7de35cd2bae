use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

/// Semantic version of a generated project (`X.Y.Z` with an optional
/// `-pre` suffix).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    pre: Option<String>,
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    pub fn with_pre(mut self, pre: impl Into<String>) -> Self {
        self.pre = Some(pre.into());
        self
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 1, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (s, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("invalid version '{s}', expected 'X.Y.Z'"));
        }

        let component = |part: &str, what: &str| {
            part.parse::<u32>()
                .map_err(|_| format!("invalid {what} component in version '{s}'"))
        };

        let pre = match pre {
            Some(p)
                if p.is_empty()
                    || !p.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') =>
            {
                return Err(format!("invalid pre-release '{p}' in version '{s}'"));
            }
            Some(p) => Some(p.to_string()),
            None => None,
        };

        Ok(Self {
            major: component(parts[0], "major")?,
            minor: component(parts[1], "minor")?,
            patch: component(parts[2], "patch")?,
            pre,
        })
    }
}
