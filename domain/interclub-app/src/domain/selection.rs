use chrono::{DateTime, Utc};
use interclub_core::{FixtureId, SelectionEntry, TeamId};

use crate::domain::{RepoError, RepoRetrieveError, RepoUpdateError};

/// A team's report of an incident preventing a normal selection. Once an
/// administrator acknowledges it the team may edit past the deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchNotice {
    pub fixture: FixtureId,
    pub team: TeamId,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl ScratchNotice {
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }
}

#[async_trait::async_trait]
pub trait SelectionRepository {
    /// An unsubmitted selection reads as empty.
    async fn get_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<Vec<SelectionEntry>, RepoError>;

    async fn replace_selection(
        &self,
        fixture: FixtureId,
        team: TeamId,
        entries: Vec<SelectionEntry>,
    ) -> Result<(), RepoError>;
}

#[async_trait::async_trait]
pub trait ScratchNoticeRepository {
    async fn get_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
    ) -> Result<ScratchNotice, RepoRetrieveError>;

    /// Inserts or replaces the notice for its (fixture, team).
    async fn save_scratch_notice(&self, notice: ScratchNotice) -> Result<(), RepoError>;

    async fn acknowledge_scratch_notice(
        &self,
        fixture: FixtureId,
        team: TeamId,
        at: DateTime<Utc>,
    ) -> Result<(), RepoUpdateError>;
}
