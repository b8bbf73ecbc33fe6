//! Field constraint checks for create and partial-update requests.
//!
//! All checks are pure and run before any store mutation. Every error names
//! the offending field so callers can map it straight to a client response.

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

use crate::player::{PlayerDraft, PlayerPatch};

pub const NAME_MAX_LEN: usize = 12;
pub const TITLE_MAX_LEN: usize = 30;
pub const EXPERIENCE_MAX: i32 = 10_000_000;
pub const BIRTHDAY_YEAR_MIN: i32 = 2000;
pub const BIRTHDAY_YEAR_MAX: i32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("name must be 1-{NAME_MAX_LEN} characters, got {0}")]
    NameLength(usize),
    #[error("title must be 1-{TITLE_MAX_LEN} characters, got {0}")]
    TitleLength(usize),
    #[error("experience must be within [0, {EXPERIENCE_MAX}], got {0}")]
    ExperienceOutOfRange(i32),
    #[error("birthday year must be within [{BIRTHDAY_YEAR_MIN}, {BIRTHDAY_YEAR_MAX}], got {0}")]
    BirthdayOutOfRange(i32),
    #[error("id must be positive, got {0}")]
    NonPositiveId(i64),
}

/// Entity ids are positive; anything below 1 is rejected before the store is
/// ever consulted.
pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id < 1 {
        return Err(ValidationError::NonPositiveId(id));
    }
    Ok(())
}

/// Create requires every field present and within bounds.
pub fn validate_draft(draft: &PlayerDraft) -> Result<(), ValidationError> {
    let name = draft
        .name
        .as_deref()
        .ok_or(ValidationError::MissingField("name"))?;
    let title = draft
        .title
        .as_deref()
        .ok_or(ValidationError::MissingField("title"))?;
    if draft.race.is_none() {
        return Err(ValidationError::MissingField("race"));
    }
    if draft.profession.is_none() {
        return Err(ValidationError::MissingField("profession"));
    }
    let birthday = draft
        .birthday
        .ok_or(ValidationError::MissingField("birthday"))?;
    let experience = draft
        .experience
        .ok_or(ValidationError::MissingField("experience"))?;

    check_name(name)?;
    check_title(title)?;
    check_experience(experience)?;
    check_birthday(birthday)
}

/// Partial update: absent fields mean "leave unchanged", present fields get
/// the same bound checks as create.
pub fn validate_patch(patch: &PlayerPatch) -> Result<(), ValidationError> {
    if let Some(name) = patch.name.as_deref() {
        check_name(name)?;
    }
    if let Some(title) = patch.title.as_deref() {
        check_title(title)?;
    }
    if let Some(experience) = patch.experience {
        check_experience(experience)?;
    }
    if let Some(birthday) = patch.birthday {
        check_birthday(birthday)?;
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(ValidationError::NameLength(len));
    }
    Ok(())
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 || len > TITLE_MAX_LEN {
        return Err(ValidationError::TitleLength(len));
    }
    Ok(())
}

fn check_experience(experience: i32) -> Result<(), ValidationError> {
    if !(0..=EXPERIENCE_MAX).contains(&experience) {
        return Err(ValidationError::ExperienceOutOfRange(experience));
    }
    Ok(())
}

fn check_birthday(birthday: DateTime<Utc>) -> Result<(), ValidationError> {
    let year = birthday.year();
    if !(BIRTHDAY_YEAR_MIN..=BIRTHDAY_YEAR_MAX).contains(&year) {
        return Err(ValidationError::BirthdayOutOfRange(year));
    }
    Ok(())
}
