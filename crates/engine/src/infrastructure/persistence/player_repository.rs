//! SQLite implementation of the player store port.
//!
//! List and count share one predicate-pushing routine over a
//! `sqlx::QueryBuilder`, so the two queries can never disagree about which
//! rows match a filter. Every filter value is a bound parameter; the ORDER BY
//! column comes from the closed `PlayerOrder::column` mapping, never from
//! request text.

use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use roster_domain::{Page, Player, PlayerFilter, PlayerOrder, Profession, Race};

use crate::infrastructure::ports::{PlayerRepo, RepoError};

const SELECT_COLUMNS: &str = "SELECT id, name, title, race, profession, birthday, experience, \
     level, until_next_level, banned FROM players";

/// Raw row shape: enums as TEXT, birthday as epoch millis, banned as INTEGER.
type PlayerRow = (i64, String, String, String, String, i64, i32, i32, i32, bool);

pub struct SqlitePlayerRepo {
    pool: SqlitePool,
}

impl SqlitePlayerRepo {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        // AUTOINCREMENT keeps ids monotonic, so an id is never reused after
        // its row is deleted.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                title TEXT NOT NULL,
                race TEXT NOT NULL,
                profession TEXT NOT NULL,
                birthday INTEGER NOT NULL,
                experience INTEGER NOT NULL,
                level INTEGER NOT NULL,
                until_next_level INTEGER NOT NULL,
                banned INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

/// Append the WHERE clause for a filter. Used verbatim by both the list and
/// the count query.
fn push_filters<'qb>(builder: &mut QueryBuilder<'qb, Sqlite>, filter: &'qb PlayerFilter) {
    let mut sep = " WHERE ";
    let mut and = |builder: &mut QueryBuilder<'qb, Sqlite>| {
        builder.push(sep);
        sep = " AND ";
    };

    if let Some(name) = &filter.name {
        and(builder);
        // instr keeps the needle a bound value; LIKE would need wildcard
        // escaping and is case-insensitive for ASCII in SQLite.
        builder.push("instr(name, ");
        builder.push_bind(name.as_str());
        builder.push(") > 0");
    }
    if let Some(title) = &filter.title {
        and(builder);
        builder.push("instr(title, ");
        builder.push_bind(title.as_str());
        builder.push(") > 0");
    }
    if let Some(race) = filter.race {
        and(builder);
        builder.push("race = ");
        builder.push_bind(race.as_str());
    }
    if let Some(profession) = filter.profession {
        and(builder);
        builder.push("profession = ");
        builder.push_bind(profession.as_str());
    }
    if let Some(after) = filter.after {
        and(builder);
        builder.push("birthday >= ");
        builder.push_bind(after.timestamp_millis());
    }
    if let Some(before) = filter.before {
        and(builder);
        builder.push("birthday <= ");
        builder.push_bind(before.timestamp_millis());
    }
    if let Some(banned) = filter.banned {
        and(builder);
        builder.push("banned = ");
        builder.push_bind(banned);
    }
    if let Some(min_experience) = filter.min_experience {
        and(builder);
        builder.push("experience >= ");
        builder.push_bind(min_experience);
    }
    if let Some(max_experience) = filter.max_experience {
        and(builder);
        builder.push("experience <= ");
        builder.push_bind(max_experience);
    }
    if let Some(min_level) = filter.min_level {
        and(builder);
        builder.push("level >= ");
        builder.push_bind(min_level);
    }
    if let Some(max_level) = filter.max_level {
        and(builder);
        builder.push("level <= ");
        builder.push_bind(max_level);
    }
}

fn row_to_player(row: PlayerRow) -> Result<Player, RepoError> {
    let (id, name, title, race, profession, birthday, experience, level, until_next_level, banned) =
        row;
    let race = race
        .parse::<Race>()
        .map_err(|e| RepoError::Database(format!("race column: {e}")))?;
    let profession = profession
        .parse::<Profession>()
        .map_err(|e| RepoError::Database(format!("profession column: {e}")))?;
    let birthday = DateTime::from_timestamp_millis(birthday)
        .ok_or_else(|| RepoError::Database(format!("birthday column out of range: {birthday}")))?;

    Ok(Player {
        id,
        name,
        title,
        race,
        profession,
        birthday,
        experience,
        level,
        until_next_level,
        banned,
    })
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

#[async_trait]
impl PlayerRepo for SqlitePlayerRepo {
    async fn get(&self, id: i64) -> Result<Option<Player>, RepoError> {
        let row: Option<PlayerRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(row_to_player).transpose()
    }

    async fn insert(&self, player: &Player) -> Result<Player, RepoError> {
        let result = sqlx::query(
            "INSERT INTO players \
             (name, title, race, profession, birthday, experience, level, until_next_level, banned) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&player.name)
        .bind(&player.title)
        .bind(player.race.as_str())
        .bind(player.profession.as_str())
        .bind(player.birthday.timestamp_millis())
        .bind(player.experience)
        .bind(player.level)
        .bind(player.until_next_level)
        .bind(player.banned)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Player {
            id: result.last_insert_rowid(),
            ..player.clone()
        })
    }

    async fn update(&self, player: &Player) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE players SET name = ?, title = ?, race = ?, profession = ?, birthday = ?, \
             experience = ?, level = ?, until_next_level = ?, banned = ? WHERE id = ?",
        )
        .bind(&player.name)
        .bind(&player.title)
        .bind(player.race.as_str())
        .bind(player.profession.as_str())
        .bind(player.birthday.timestamp_millis())
        .bind(player.experience)
        .bind(player.level)
        .bind(player.until_next_level)
        .bind(player.banned)
        .bind(player.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn list(
        &self,
        filter: &PlayerFilter,
        order: PlayerOrder,
        page: Page,
    ) -> Result<Vec<Player>, RepoError> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY ");
        builder.push(order.column());
        builder.push(" ASC LIMIT ");
        builder.push_bind(i64::from(page.size));
        builder.push(" OFFSET ");
        // An offset beyond i64::MAX is past any possible row anyway.
        builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows: Vec<PlayerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(row_to_player).collect()
    }

    async fn count(&self, filter: &PlayerFilter) -> Result<i64, RepoError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM players");
        push_filters(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roster_domain::progression;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_repo() -> SqlitePlayerRepo {
        // One connection so every handle sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory sqlite");
        SqlitePlayerRepo::new(pool).await.expect("create schema")
    }

    fn player(
        name: &str,
        title: &str,
        race: Race,
        profession: Profession,
        year: i32,
        experience: i32,
        banned: bool,
    ) -> Player {
        let level = progression::level_for(experience);
        Player {
            id: 0,
            name: name.to_string(),
            title: title.to_string(),
            race,
            profession,
            birthday: Utc
                .with_ymd_and_hms(year, 3, 1, 0, 0, 0)
                .single()
                .expect("valid date"),
            experience,
            level,
            until_next_level: progression::until_next_level(experience, level),
            banned,
        }
    }

    async fn seeded_repo() -> SqlitePlayerRepo {
        let repo = test_repo().await;
        let seed = [
            player("Aragorn", "King", Race::Human, Profession::Warrior, 2100, 9000, false),
            player("Gimli", "Axe Bearer", Race::Dwarf, Profession::Warrior, 2200, 400, false),
            player("Legolas", "Archer", Race::Elf, Profession::Rogue, 2300, 4000, false),
            player("Gandalf", "The Grey", Race::Human, Profession::Warlock, 2050, 10_000_000, false),
            player("Grima", "Wormtongue", Race::Human, Profession::Rogue, 2400, 50, true),
            player("Sam", "Gardener", Race::Hobbit, Profession::Cleric, 2500, 100, false),
            player("Lurtz", "Uruk Captain", Race::Orc, Profession::Warrior, 2600, 700, true),
        ];
        for p in &seed {
            repo.insert(p).await.expect("seed insert");
        }
        repo
    }

    fn everyone() -> Page {
        Page::new(None, Some(100))
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_round_trips() {
        let repo = test_repo().await;
        let created = repo
            .insert(&player("Frodo", "Ring Bearer", Race::Hobbit, Profession::Rogue, 2400, 100, false))
            .await
            .expect("insert");
        assert!(created.id >= 1);

        let fetched = repo.get(created.id).await.expect("get").expect("present");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = test_repo().await;
        let first = repo
            .insert(&player("Frodo", "Ring Bearer", Race::Hobbit, Profession::Rogue, 2400, 100, false))
            .await
            .expect("insert");
        assert_eq!(repo.delete(first.id).await.expect("delete"), 1);

        let second = repo
            .insert(&player("Bilbo", "Burglar", Race::Hobbit, Profession::Rogue, 2300, 200, false))
            .await
            .expect("insert");
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn delete_missing_row_returns_zero() {
        let repo = test_repo().await;
        assert_eq!(repo.delete(42).await.expect("delete"), 0);
    }

    #[tokio::test]
    async fn update_missing_row_touches_nothing() {
        let repo = test_repo().await;
        let phantom = Player {
            id: 99,
            ..player("Ghost", "Nobody", Race::Human, Profession::Cleric, 2100, 0, false)
        };
        assert_eq!(repo.update(&phantom).await.expect("update"), 0);
    }

    #[tokio::test]
    async fn update_persists_full_row() {
        let repo = test_repo().await;
        let created = repo
            .insert(&player("Frodo", "Ring Bearer", Race::Hobbit, Profession::Rogue, 2400, 100, false))
            .await
            .expect("insert");

        let changed = Player {
            title: "Of the Shire".to_string(),
            banned: true,
            ..created.clone()
        };
        assert_eq!(repo.update(&changed).await.expect("update"), 1);
        let fetched = repo.get(created.id).await.expect("get").expect("present");
        assert_eq!(fetched, changed);
    }

    #[tokio::test]
    async fn name_filter_is_case_sensitive_substring() {
        let repo = seeded_repo().await;

        let filter = PlayerFilter {
            name: Some("G".to_string()),
            ..Default::default()
        };
        let found = repo
            .list(&filter, PlayerOrder::Id, everyone())
            .await
            .expect("list");
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Gimli", "Gandalf", "Grima"]);

        let lower = PlayerFilter {
            name: Some("gandalf".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&lower).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn equality_filters_match_exactly() {
        let repo = seeded_repo().await;

        let humans = PlayerFilter {
            race: Some(Race::Human),
            ..Default::default()
        };
        assert_eq!(repo.count(&humans).await.expect("count"), 3);

        let banned_warriors = PlayerFilter {
            profession: Some(Profession::Warrior),
            banned: Some(true),
            ..Default::default()
        };
        let found = repo
            .list(&banned_warriors, PlayerOrder::Id, everyone())
            .await
            .expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Lurtz");
    }

    #[tokio::test]
    async fn birthday_bounds_are_inclusive() {
        let repo = seeded_repo().await;
        let exact = Utc
            .with_ymd_and_hms(2300, 3, 1, 0, 0, 0)
            .single()
            .expect("valid date");

        let filter = PlayerFilter {
            after: Some(exact),
            before: Some(exact),
            ..Default::default()
        };
        let found = repo
            .list(&filter, PlayerOrder::Id, everyone())
            .await
            .expect("list");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Legolas");
    }

    #[tokio::test]
    async fn numeric_range_filters_are_inclusive() {
        let repo = seeded_repo().await;

        let filter = PlayerFilter {
            min_experience: Some(100),
            max_experience: Some(700),
            ..Default::default()
        };
        let found = repo
            .list(&filter, PlayerOrder::Experience, everyone())
            .await
            .expect("list");
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Sam", "Gimli", "Lurtz"]);

        let high_level = PlayerFilter {
            min_level: Some(progression::level_for(9000)),
            ..Default::default()
        };
        assert_eq!(repo.count(&high_level).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn default_order_is_ascending_id() {
        let repo = seeded_repo().await;
        let found = repo
            .list(&PlayerFilter::default(), PlayerOrder::Id, everyone())
            .await
            .expect("list");
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 7);
    }

    #[tokio::test]
    async fn order_by_name_sorts_ascending() {
        let repo = seeded_repo().await;
        let found = repo
            .list(&PlayerFilter::default(), PlayerOrder::Name, everyone())
            .await
            .expect("list");
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn pagination_slices_without_gaps_or_overlap() {
        let repo = seeded_repo().await;
        let filter = PlayerFilter {
            banned: Some(false),
            ..Default::default()
        };
        let total = repo.count(&filter).await.expect("count");

        for size in [1u32, 2, 3, 5] {
            let mut collected = Vec::new();
            let mut page_number = 0;
            loop {
                let page = repo
                    .list(&filter, PlayerOrder::Id, Page::new(Some(page_number), Some(size)))
                    .await
                    .expect("list");
                if page.is_empty() {
                    break;
                }
                assert!(page.len() <= size as usize);
                collected.extend(page.into_iter().map(|p| p.id));
                page_number += 1;
            }
            assert_eq!(collected.len() as i64, total, "page size {size}");
            let mut deduped = collected.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), collected.len(), "page size {size}");
        }
    }

    #[tokio::test]
    async fn far_out_page_is_empty_not_a_panic() {
        let repo = seeded_repo().await;
        let found = repo
            .list(
                &PlayerFilter::default(),
                PlayerOrder::Id,
                Page::new(Some(1_000_000), Some(100_000)),
            )
            .await
            .expect("list");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn default_page_size_is_three() {
        let repo = seeded_repo().await;
        let found = repo
            .list(&PlayerFilter::default(), PlayerOrder::Id, Page::default())
            .await
            .expect("list");
        assert_eq!(found.len(), 3);
    }
}
