//! Player use cases: create, read, update, delete, list, count.
//!
//! Validation runs before any store mutation, and id bounds are checked here
//! centrally so no point operation ever reaches the store with id < 1.
//! "Not found" is an absent `Option`, never an error.

use std::sync::Arc;

use roster_domain::{
    progression, validation, Page, Player, PlayerDraft, PlayerFilter, PlayerOrder, PlayerPatch,
    ValidationError,
};

use crate::infrastructure::ports::{PlayerRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct PlayerOps {
    repo: Arc<dyn PlayerRepo>,
}

impl PlayerOps {
    pub fn new(repo: Arc<dyn PlayerRepo>) -> Self {
        Self { repo }
    }

    /// Validate, derive level fields, insert.
    pub async fn create(&self, draft: PlayerDraft) -> Result<Player, PlayerError> {
        validation::validate_draft(&draft)?;

        // validate_draft guarantees presence of every required field.
        let (Some(name), Some(title), Some(race), Some(profession), Some(birthday), Some(experience)) = (
            draft.name,
            draft.title,
            draft.race,
            draft.profession,
            draft.birthday,
            draft.experience,
        ) else {
            return Err(ValidationError::MissingField("player").into());
        };

        let level = progression::level_for(experience);
        let candidate = Player {
            id: 0,
            name,
            title,
            race,
            profession,
            birthday,
            experience,
            level,
            until_next_level: progression::until_next_level(experience, level),
            banned: draft.banned.unwrap_or(false),
        };

        let created = self.repo.insert(&candidate).await?;
        tracing::info!(id = created.id, name = %created.name, "created player");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Player>, PlayerError> {
        validation::validate_id(id)?;
        Ok(self.repo.get(id).await?)
    }

    /// Partial update. An absent or empty patch behaves as a plain read of
    /// the current record. Present fields are bound-checked first, then
    /// applied onto the loaded record; level fields are recomputed when
    /// experience changes. Read-merge-write without locking: concurrent
    /// updates to the same id are last-write-wins.
    pub async fn update(
        &self,
        id: i64,
        patch: Option<PlayerPatch>,
    ) -> Result<Option<Player>, PlayerError> {
        validation::validate_id(id)?;

        let patch = match patch {
            Some(patch) if !patch.is_empty() => patch,
            _ => return Ok(self.repo.get(id).await?),
        };

        validation::validate_patch(&patch)?;

        let Some(mut player) = self.repo.get(id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            player.name = name;
        }
        if let Some(title) = patch.title {
            player.title = title;
        }
        if let Some(race) = patch.race {
            player.race = race;
        }
        if let Some(profession) = patch.profession {
            player.profession = profession;
        }
        if let Some(birthday) = patch.birthday {
            player.birthday = birthday;
        }
        if let Some(experience) = patch.experience {
            player.experience = experience;
            player.level = progression::level_for(experience);
            player.until_next_level = progression::until_next_level(experience, player.level);
        }
        if let Some(banned) = patch.banned {
            player.banned = banned;
        }

        if self.repo.update(&player).await? == 0 {
            // Row vanished between read and write.
            return Ok(None);
        }
        tracing::info!(id, "updated player");
        Ok(Some(player))
    }

    /// Returns the removed-count (0 or 1).
    pub async fn delete(&self, id: i64) -> Result<u64, PlayerError> {
        validation::validate_id(id)?;
        let removed = self.repo.delete(id).await?;
        if removed > 0 {
            tracing::info!(id, "deleted player");
        }
        Ok(removed)
    }

    pub async fn list(
        &self,
        filter: &PlayerFilter,
        order: PlayerOrder,
        page: Page,
    ) -> Result<Vec<Player>, PlayerError> {
        Ok(self.repo.list(filter, order, page).await?)
    }

    pub async fn count(&self, filter: &PlayerFilter) -> Result<i64, PlayerError> {
        Ok(self.repo.count(filter).await?)
    }
}
