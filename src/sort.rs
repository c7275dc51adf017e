// Standard Library Imports
use std::fmt::{self, Formatter};

// External Crate Imports
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use tracing::warn;

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Direction {
    Ascending,
    Descending,
}

/// An ordered list of sort keys. Earlier attributes take priority over later ones
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Sort(Vec<(String, Direction)>);

impl Sort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON object carried in the route. A malformed parameter is treated like no sort at all, so a
    /// mangled bookmark still opens the page
    #[must_use]
    pub fn parse(param: &str) -> Self {
        if param.trim().is_empty() {
            return Self::default();
        }

        serde_json::from_str(param).unwrap_or_else(|error| {
            warn!(param, %error, "ignoring malformed sort parameter");
            Self::default()
        })
    }

    #[must_use]
    pub fn to_param(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            // SAFETY: Serialising a map of strings to integers can't fail
            serde_json::to_string(self).unwrap()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn direction_of(&self, attribute: &str) -> Option<Direction> {
        self.0
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|&(_, direction)| direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.0.iter().map(|(name, direction)| (name.as_str(), *direction))
    }

    /// Cycles `attribute` through ascending → descending → unsorted, making it the primary sort key whenever it's
    /// still sorted
    #[must_use]
    pub fn toggle(&self, attribute: &str) -> Self {
        let next = match self.direction_of(attribute) {
            None => Some(Direction::Ascending),
            Some(Direction::Ascending) => Some(Direction::Descending),
            Some(Direction::Descending) => None,
        };

        let rest = self.0.iter().filter(|(name, _)| name != attribute).cloned();
        let sort = next
            .map(|direction| (attribute.to_owned(), direction))
            .into_iter()
            .chain(rest)
            .collect();

        Self(sort)
    }
}

impl Direction {
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Direction)> for Sort {
    fn from_iter<T: IntoIterator<Item = (S, Direction)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, d)| (name.into(), d)).collect())
    }
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (attribute, direction) in &self.0 {
            map.serialize_entry(attribute, &direction.as_i8())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Sort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SortVisitor)
    }
}

// Private Helper Code =================================================================================================

// NOTE: Going through a `Visitor` rather than `serde_json::Map` keeps the keys in the order they were written, which
// is the priority order of the sort
struct SortVisitor;

impl<'de> Visitor<'de> for SortVisitor {
    type Value = Sort;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object mapping attributes to 1 or -1")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut sort = Vec::with_capacity(access.size_hint().unwrap_or_default());

        while let Some((attribute, direction)) = access.next_entry::<String, i64>()? {
            let direction = match direction {
                1 => Direction::Ascending,
                -1 => Direction::Descending,
                other => {
                    return Err(de::Error::custom(format!(
                        "sort direction for `{attribute}` must be 1 or -1, not {other}"
                    )));
                }
            };

            // A repeated key replaces the earlier one but keeps its original priority
            if let Some(existing) = sort.iter_mut().find(|(name, _)| *name == attribute) {
                existing.1 = direction;
            } else {
                sort.push((attribute, direction));
            }
        }

        Ok(Sort(sort))
    }
}

// Unit Tests ==========================================================================================================
