pub mod csv_store;
pub mod normalize;
pub mod provider;
pub mod wikipedia;

pub use provider::TournamentSource;
pub use wikipedia::WikipediaSource;

use anyhow::Result;
use tracing::{info, warn};

use crate::tournament::HistoricalMatch;

/// Fetch every listed tournament **concurrently** and merge the cleaned
/// results in year order. A year that fails to download is logged and
/// skipped; if every year fails the last error is returned.
pub async fn collect_history(
    source: &dyn TournamentSource,
    years: &[u16],
) -> Result<Vec<HistoricalMatch>> {
    let fetches: Vec<_> = years.iter().map(|&year| source.fetch_matches(year)).collect();
    let results = futures_util::future::join_all(fetches).await;

    let mut history = Vec::new();
    let mut last_err = None;
    for (year, result) in years.iter().zip(results) {
        match result {
            Ok(rows) => {
                let matches = normalize::historical_matches(&rows);
                info!(
                    "{}: {} {} matches ({} rows dropped)",
                    source.name(),
                    year,
                    matches.len(),
                    rows.len() - matches.len()
                );
                history.extend(matches);
            }
            Err(e) => {
                warn!("{}: failed to fetch {}: {:#}", source.name(), year, e);
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if history.is_empty() => Err(e),
        _ => Ok(history),
    }
}
