use interclub_core::{Player, PlayerId};

use crate::domain::RepoError;

#[async_trait::async_trait]
pub trait PlayerDirectoryPort {
    /// Looks up players by id. Unknown ids are simply missing from the result.
    async fn get_players(&self, players: &[PlayerId]) -> Result<Vec<Player>, RepoError>;
}
