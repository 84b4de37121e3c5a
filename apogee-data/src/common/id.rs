use std::{
    fmt,
    fmt::Display,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
    de::Visitor,
};

/// A normalized identifier for a resource.
///
/// Names are normalized by lowercasing and dropping every character that is not an ASCII letter
/// or digit, so `"Life Orb"`, `"life-orb"`, and `"lifeorb"` are all the same ID.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(String);

impl Id {
    fn normalize(value: &str) -> String {
        value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the ID is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(Self::normalize(value))
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&String> for Id {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for Id {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self.0 == Self::normalize(other)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Id::from(v))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(IdVisitor)
    }
}

/// A resource that has an ID.
pub trait Identifiable {
    fn id(&self) -> &Id;
}

#[cfg(test)]
mod id_test {
    use crate::{
        Id,
        test_util::test_deserialization,
    };

    #[test]
    fn normalizes_names() {
        assert_eq!(Id::from("Life Orb").as_str(), "lifeorb");
        assert_eq!(Id::from("U-turn").as_str(), "uturn");
        assert_eq!(Id::from("King's Shield").as_str(), "kingsshield");
        assert_eq!(Id::from("Porygon2").as_str(), "porygon2");
    }

    #[test]
    fn compares_to_unnormalized_strings() {
        assert_eq!(Id::from("trickroom"), "Trick Room");
        assert_ne!(Id::from("trickroom"), "Trick");
    }

    #[test]
    fn deserializes_and_normalizes() {
        test_deserialization("\"Choice Scarf\"", Id::from("choicescarf"));
    }
}
