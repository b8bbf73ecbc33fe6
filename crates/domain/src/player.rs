//! The Player entity and its request shapes.
//!
//! Wire format notes:
//! - JSON field names are camelCase (`untilNextLevel`).
//! - `birthday` travels as epoch milliseconds.
//! - Race/profession are closed string vocabularies; unknown values are
//!   rejected at the boundary, never silently ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A game-character record.
///
/// `level` and `until_next_level` are derived from `experience` (see
/// [`crate::progression`]) and are kept consistent by the use cases on every
/// create and experience-changing update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Store-assigned, positive, immutable. Never reused after deletion.
    pub id: i64,
    pub name: String,
    pub title: String,
    pub race: Race,
    pub profession: Profession,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub birthday: DateTime<Utc>,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
    pub banned: bool,
}

/// Create-request body. Every field is optional at the serde layer so that a
/// missing field surfaces as a named [`crate::ValidationError`] instead of a
/// bare deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub birthday: Option<DateTime<Utc>>,
    pub experience: Option<i32>,
    pub banned: Option<bool>,
}

/// Partial-update request body.
///
/// Absent means "leave unchanged". There is deliberately no way to clear a
/// field to empty through this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub birthday: Option<DateTime<Utc>>,
    pub experience: Option<i32>,
    pub banned: Option<bool>,
}

impl PlayerPatch {
    /// True when no mutable field is present; such a patch is a no-op and
    /// the update use case treats it as a plain read.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.race.is_none()
            && self.profession.is_none()
            && self.birthday.is_none()
            && self.experience.is_none()
            && self.banned.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Race {
    Human,
    Dwarf,
    Elf,
    Giant,
    Orc,
    Troll,
    Hobbit,
}

impl Race {
    pub fn all() -> &'static [Race] {
        &[
            Race::Human,
            Race::Dwarf,
            Race::Elf,
            Race::Giant,
            Race::Orc,
            Race::Troll,
            Race::Hobbit,
        ]
    }

    /// Wire / storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Race::Human => "HUMAN",
            Race::Dwarf => "DWARF",
            Race::Elf => "ELF",
            Race::Giant => "GIANT",
            Race::Orc => "ORC",
            Race::Troll => "TROLL",
            Race::Hobbit => "HOBBIT",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Race {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Race::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| unknown_variant(s, Race::all().iter().map(Race::as_str)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profession {
    Warrior,
    Rogue,
    Sorcerer,
    Cleric,
    Paladin,
    Nazgul,
    Warlock,
    Druid,
}

impl Profession {
    pub fn all() -> &'static [Profession] {
        &[
            Profession::Warrior,
            Profession::Rogue,
            Profession::Sorcerer,
            Profession::Cleric,
            Profession::Paladin,
            Profession::Nazgul,
            Profession::Warlock,
            Profession::Druid,
        ]
    }

    /// Wire / storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Warrior => "WARRIOR",
            Profession::Rogue => "ROGUE",
            Profession::Sorcerer => "SORCERER",
            Profession::Cleric => "CLERIC",
            Profession::Paladin => "PALADIN",
            Profession::Nazgul => "NAZGUL",
            Profession::Warlock => "WARLOCK",
            Profession::Druid => "DRUID",
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profession {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profession::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| unknown_variant(s, Profession::all().iter().map(Profession::as_str)))
    }
}

fn unknown_variant<'a>(value: &str, expected: impl Iterator<Item = &'a str>) -> String {
    format!(
        "unknown value '{}', expected one of: {}",
        value,
        expected.collect::<Vec<_>>().join(", ")
    )
}
