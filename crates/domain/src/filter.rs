//! Typed filter / order / page vocabulary for listing and counting players.
//!
//! A `PlayerFilter` is the same predicate set for both operations, which is
//! what guarantees `count(filter)` matches the total a paged listing
//! enumerates.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::player::{Profession, Race};

/// The eleven optional listing predicates. Absence means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    /// Case-sensitive substring match on name.
    pub name: Option<String>,
    /// Case-sensitive substring match on title.
    pub title: Option<String>,
    pub race: Option<Race>,
    pub profession: Option<Profession>,
    /// Inclusive lower bound on birthday.
    pub after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on birthday.
    pub before: Option<DateTime<Utc>>,
    pub banned: Option<bool>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
}

/// The single ascending sort key for listings. Ties among equal key values
/// have unspecified relative order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerOrder {
    #[default]
    Id,
    Name,
    Experience,
    Birthday,
    Level,
}

impl PlayerOrder {
    pub fn all() -> &'static [PlayerOrder] {
        &[
            PlayerOrder::Id,
            PlayerOrder::Name,
            PlayerOrder::Experience,
            PlayerOrder::Birthday,
            PlayerOrder::Level,
        ]
    }

    /// Wire value, matching the REST `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerOrder::Id => "ID",
            PlayerOrder::Name => "NAME",
            PlayerOrder::Experience => "EXPERIENCE",
            PlayerOrder::Birthday => "BIRTHDAY",
            PlayerOrder::Level => "LEVEL",
        }
    }

    /// Column the key maps to. A closed mapping so that ORDER BY text never
    /// comes from request input.
    pub fn column(&self) -> &'static str {
        match self {
            PlayerOrder::Id => "id",
            PlayerOrder::Name => "name",
            PlayerOrder::Experience => "experience",
            PlayerOrder::Birthday => "birthday",
            PlayerOrder::Level => "level",
        }
    }
}

impl fmt::Display for PlayerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerOrder::all()
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown value '{}', expected one of: {}",
                    s,
                    PlayerOrder::all()
                        .iter()
                        .map(PlayerOrder::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Offset pagination: skip `number * size` rows, take up to `size`.
/// No upper bound is enforced on `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 0-based page index.
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 3;

    pub fn new(number: Option<u32>, size: Option<u32>) -> Self {
        Self {
            number: number.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE),
        }
    }

    /// Rows to skip. Widened to u64 because both inputs come straight from
    /// unbounded query parameters and their product can exceed u32.
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let page = Page::default();
        assert_eq!(page.number, 0);
        assert_eq!(page.size, 3);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_offset_skips_whole_pages() {
        assert_eq!(Page::new(Some(2), Some(5)).offset(), 10);
    }

    #[test]
    fn page_offset_survives_huge_inputs() {
        // Both parameters are unbounded on the wire; the product must not
        // wrap or panic.
        let page = Page::new(Some(1_000_000), Some(100_000));
        assert_eq!(page.offset(), 100_000_000_000);

        let extreme = Page::new(Some(u32::MAX), Some(u32::MAX));
        assert_eq!(extreme.offset(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn order_parses_wire_values() {
        for order in PlayerOrder::all() {
            assert_eq!(
                order.as_str().parse::<PlayerOrder>().expect("parse"),
                *order
            );
        }
        assert!("BANNED".parse::<PlayerOrder>().is_err());
    }

    #[test]
    fn default_order_is_id() {
        assert_eq!(PlayerOrder::default(), PlayerOrder::Id);
    }
}
