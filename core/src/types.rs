//! Domain DTOs for the animal API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! The wire name of the image field is `avatar`; in Rust it is `avatar_url`.
//! Hosted mock APIs often hand ids back as numeric strings, so `AnimalId`
//! decodes from either form and always encodes as an integer.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Server-assigned identity of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnimalId(pub u64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AnimalId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for AnimalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(AnimalId(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(AnimalId)
                .map_err(|_| serde::de::Error::custom(format!("invalid animal id: {s:?}"))),
        }
    }
}

/// A single animal record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    pub date: String,
}

/// Request payload for creating an animal. Carries no id: the server
/// assigns identity and its response is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAnimal {
    pub name: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    pub date: String,
}

/// One text input of the edit and add forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Date,
    AvatarUrl,
}

impl Field {
    /// Form order, also the order missing fields are reported in.
    pub const ALL: [Field; 3] = [Field::Name, Field::Date, Field::AvatarUrl];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Date => "date",
            Field::AvatarUrl => "avatar URL",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Staged form values for the edit or add dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub date: String,
    pub avatar_url: String,
}

impl Draft {
    /// Stage the fields of an existing record for editing.
    pub fn from_animal(animal: &Animal) -> Self {
        Self {
            name: animal.name.clone(),
            date: animal.date.clone(),
            avatar_url: animal.avatar_url.clone(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Date => &self.date,
            Field::AvatarUrl => &self.avatar_url,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Date => self.date = value,
            Field::AvatarUrl => self.avatar_url = value,
        }
    }

    /// Every field must be non-empty before the draft may be submitted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// The record that replaces `id` once an edit is saved.
    pub fn to_animal(&self, id: AnimalId) -> Animal {
        Animal {
            id,
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            date: self.date.clone(),
        }
    }

    pub fn to_new_animal(&self) -> NewAnimal {
        NewAnimal {
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            date: self.date.clone(),
        }
    }
}
