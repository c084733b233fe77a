use chrono::{DateTime, Utc};
use interclub_app::domain::{
    RepoError, RepoRetrieveError, RepoUpdateError,
    selection::{ScratchNotice, ScratchNoticeRepository, SelectionRepository},
};
use interclub_core::{FixtureId, PlayerId, SelectionEntry, TeamId};
use sqlx::{Row, sqlite::SqliteRow};

use crate::{SqliteStore, codec};

fn entry_from_row(row: &SqliteRow) -> sqlx::Result<SelectionEntry> {
    Ok(SelectionEntry {
        player: PlayerId(row.try_get("player")?),
        order: codec::small(row.try_get("position")?, "position")?,
    })
}

fn notice_from_row(row: &SqliteRow) -> sqlx::Result<ScratchNotice> {
    let acknowledged_at: Option<&str> = row.try_get("acknowledged_at")?;
    Ok(ScratchNotice {
        fixture: FixtureId(row.try_get("fixture")?),
        team: TeamId(row.try_get("team")?),
        message: row.try_get("message")?,
        submitted_at: codec::timestamp(row.try_get("submitted_at")?)?,
        acknowledged_at: acknowledged_at.map(codec::timestamp).transpose()?,
    })
}

impl SqliteStore {
    async fn store_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
        entries: &[SelectionEntry],
    ) -> sqlx::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM selections WHERE fixture = ? AND team = ?")
            .bind(fixture.0)
            .bind(team.0)
            .execute(&mut *tx)
            .await?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO selections (fixture, team, player, position) VALUES (?, ?, ?, ?)",
            )
            .bind(fixture.0)
            .bind(team.0)
            .bind(entry.player.0)
            .bind(i64::from(entry.order))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}

#[async_trait::async_trait]
impl SelectionRepository for SqliteStore {
    async fn get_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<Vec<SelectionEntry>, RepoError> {
        let rows = sqlx::query(
            "SELECT player, position FROM selections
             WHERE fixture = ? AND team = ? ORDER BY position",
        )
        .bind(fixture.0)
        .bind(team.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(entry_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn replace_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
        entries: Vec<SelectionEntry>,
    ) -> Result<(), RepoError> {
        self.store_selection(fixture, team, &entries)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ScratchNoticeRepository for SqliteStore {
    async fn get_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<ScratchNotice, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM scratch_notices WHERE fixture = ? AND team = ?")
            .bind(fixture.0)
            .bind(team.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        notice_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn save_scratch_notice(&self, notice: ScratchNotice) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO scratch_notices (fixture, team, message, submitted_at, acknowledged_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (fixture, team) DO UPDATE SET
                message = excluded.message,
                submitted_at = excluded.submitted_at,
                acknowledged_at = excluded.acknowledged_at",
        )
        .bind(notice.fixture.0)
        .bind(notice.team.0)
        .bind(notice.message.as_str())
        .bind(codec::timestamp_to_str(notice.submitted_at))
        .bind(notice.acknowledged_at.map(codec::timestamp_to_str))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn acknowledge_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoUpdateError> {
        let result = sqlx::query(
            "UPDATE scratch_notices SET acknowledged_at = ? WHERE fixture = ? AND team = ?",
        )
        .bind(codec::timestamp_to_str(at))
        .bind(fixture.0)
        .bind(team.0)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::testing::*;

    use super::*;

    #[tokio::test]
    async fn test_selection_is_read_in_order_and_replaced_whole() {
        let store = seeded_store(2).await;
        let fixture = FixtureId(1);
        let entries = |ids: &[(i64, u8)]| {
            ids.iter()
                .map(|&(n, order)| SelectionEntry {
                    player: player_id(1, n),
                    order,
                })
                .collect::<Vec<_>>()
        };

        assert!(
            store
                .get_selection(fixture, TeamId(1))
                .await
                .unwrap()
                .is_empty()
        );
        store
            .replace_selection(fixture, TeamId(1), entries(&[(3, 2), (1, 1), (2, 3)]))
            .await
            .unwrap();
        assert_eq!(
            store.get_selection(fixture, TeamId(1)).await.unwrap(),
            entries(&[(1, 1), (3, 2), (2, 3)])
        );

        store
            .replace_selection(fixture, TeamId(1), entries(&[(5, 1)]))
            .await
            .unwrap();
        assert_eq!(
            store.get_selection(fixture, TeamId(1)).await.unwrap(),
            entries(&[(5, 1)])
        );
        assert!(
            store
                .get_selection(fixture, TeamId(2))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_notice_is_upserted_and_acknowledged() {
        let store = seeded_store(2).await;
        let submitted_at = Utc.with_ymd_and_hms(2025, 4, 5, 8, 0, 0).unwrap();
        let acknowledged_at = Utc.with_ymd_and_hms(2025, 4, 5, 9, 30, 0).unwrap();
        let notice = ScratchNotice {
            fixture: FixtureId(1),
            team: TeamId(2),
            message: "Two players down with flu".to_string(),
            submitted_at,
            acknowledged_at: None,
        };

        assert!(matches!(
            store
                .acknowledge_scratch_notice(FixtureId(1), TeamId(2), acknowledged_at)
                .await,
            Err(RepoUpdateError::NotFound)
        ));
        store.save_scratch_notice(notice.clone()).await.unwrap();
        store
            .acknowledge_scratch_notice(FixtureId(1), TeamId(2), acknowledged_at)
            .await
            .unwrap();

        let stored = store
            .get_scratch_notice(FixtureId(1), TeamId(2))
            .await
            .unwrap();
        assert_eq!(stored.acknowledged_at, Some(acknowledged_at));

        store
            .save_scratch_notice(ScratchNotice {
                message: "Three players down with flu".to_string(),
                acknowledged_at: Some(acknowledged_at),
                ..notice
            })
            .await
            .unwrap();
        let stored = store
            .get_scratch_notice(FixtureId(1), TeamId(2))
            .await
            .unwrap();
        assert_eq!(stored.message, "Three players down with flu");
        assert!(stored.is_acknowledged());
    }
}
