use anyhow::Result;
use async_trait::async_trait;

use crate::tournament::{FixtureRow, GroupTable};

/// Trait that every tournament data source must implement.
#[async_trait]
pub trait TournamentSource: Send + Sync {
    /// Every match listed for the given edition, in page order. Scores are
    /// returned raw; for unplayed fixtures the score column holds the match
    /// code.
    async fn fetch_matches(&self, year: u16) -> Result<Vec<FixtureRow>>;

    /// Group membership tables for the given edition, lettered in page order.
    async fn fetch_groups(&self, year: u16) -> Result<Vec<GroupTable>>;

    /// Fixture list and group tables of one edition together. Sources that
    /// serve both from one document should override this to fetch it once.
    async fn fetch_edition(&self, year: u16) -> Result<(Vec<FixtureRow>, Vec<GroupTable>)> {
        let matches = self.fetch_matches(year).await?;
        let groups = self.fetch_groups(year).await?;
        Ok((matches, groups))
    }

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
