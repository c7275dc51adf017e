// Standard Library Imports
use std::collections::HashMap;

// External Crate Imports
use serde::{Deserialize, Serialize};

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccessLevel {
    #[default]
    None,
    Count,
    Read,
    Write,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(HashMap<String, AccessLevel>);

impl Permissions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn grant(mut self, resource: impl Into<String>, level: AccessLevel) -> Self {
        self.0.insert(resource.into(), level);
        self
    }

    #[must_use]
    pub fn level(&self, resource: &str) -> AccessLevel {
        self.0.get(resource).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn has_access(&self, resource: &str, level: AccessLevel) -> bool {
        self.level(resource) >= level
    }
}

impl<R: Into<String>> FromIterator<(R, AccessLevel)> for Permissions {
    fn from_iter<T: IntoIterator<Item = (R, AccessLevel)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(r, l)| (r.into(), l)).collect())
    }
}

impl TryFrom<u8> for AccessLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Count),
            2 => Ok(Self::Read),
            3 => Ok(Self::Write),
            _ => Err(format!("{value} is not a valid access level (expected 0 to 3)")),
        }
    }
}

impl From<AccessLevel> for u8 {
    fn from(value: AccessLevel) -> Self {
        value as Self
    }
}

// Unit Tests ==========================================================================================================
