use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::normalize;
use super::provider::TournamentSource;
use crate::tournament::{FixtureRow, GroupId, GroupTable};

/// Tournament source backed by the English Wikipedia "UEFA Euro <year>" pages.
pub struct WikipediaSource {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
}

impl WikipediaSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("euro-predictor/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url))
    }

    fn with_client(http: Client, base_url: &str) -> Self {
        WikipediaSource {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, year: u16) -> String {
        format!("{}/UEFA_Euro_{}", self.base_url, year)
    }

    async fn fetch_page(&self, year: u16) -> Result<String> {
        let url = self.page_url(year);
        debug!("Fetching {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Wikipedia request failed: {}", url))?;

        if !resp.status().is_success() {
            anyhow::bail!("Wikipedia error for {}: {}", url, resp.status());
        }

        resp.text()
            .await
            .with_context(|| format!("Failed to read Wikipedia page {}", url))
    }
}

#[async_trait]
impl TournamentSource for WikipediaSource {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    async fn fetch_matches(&self, year: u16) -> Result<Vec<FixtureRow>> {
        let html = self.fetch_page(year).await?;
        Ok(parse_football_boxes(&html, year))
    }

    async fn fetch_groups(&self, year: u16) -> Result<Vec<GroupTable>> {
        let html = self.fetch_page(year).await?;
        parse_group_tables(&html)
    }

    async fn fetch_edition(&self, year: u16) -> Result<(Vec<FixtureRow>, Vec<GroupTable>)> {
        let html = self.fetch_page(year).await?;
        let groups = parse_group_tables(&html)?;
        Ok((parse_football_boxes(&html, year), groups))
    }
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors below.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e}"))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract every `div.footballbox` as (home, score, away), in page order.
pub fn parse_football_boxes(html: &str, year: u16) -> Vec<FixtureRow> {
    let document = Html::parse_document(html);
    let box_sel = selector("div.footballbox");
    let home_sel = selector("th.fhome");
    let score_sel = selector("th.fscore");
    let away_sel = selector("th.faway");

    document
        .select(&box_sel)
        .filter_map(|fb| {
            let home = fb.select(&home_sel).next().map(cell_text)?;
            let score = fb.select(&score_sel).next().map(cell_text)?;
            let away = fb.select(&away_sel).next().map(cell_text)?;
            Some(FixtureRow {
                home,
                score,
                away,
                year,
            })
        })
        .collect()
}

/// Extract group standings tables: any `table.wikitable` whose header has
/// both a "Team" and a "Pts" column and exactly four team rows. Groups are
/// lettered A, B, C, ... in page order.
pub fn parse_group_tables(html: &str) -> Result<Vec<GroupTable>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table.wikitable");
    let row_sel = selector("tr");
    let header_sel = selector("th");
    let cell_sel = selector("th, td");

    let mut groups = Vec::new();
    for table in document.select(&table_sel) {
        let mut rows = table.select(&row_sel);
        let Some(header) = rows.next() else {
            continue;
        };
        let headers: Vec<String> = header.select(&header_sel).map(cell_text).collect();
        // Wikipedia renders the navbox links into the header ("Teamvte").
        let Some(team_col) = headers.iter().position(|h| h.starts_with("Team")) else {
            continue;
        };
        if !headers.iter().any(|h| h == "Pts") {
            continue;
        }

        let teams: Vec<String> = rows
            .filter_map(|row| {
                let cell = row.select(&cell_sel).nth(team_col)?;
                Some(normalize::team_name(&cell_text(cell)))
            })
            .filter(|name| !name.is_empty())
            .collect();
        if teams.len() != GroupTable::SIZE {
            continue;
        }

        let letter = (b'A' + groups.len() as u8) as char;
        let group = GroupId::new(letter).context("too many group tables on page")?;
        groups.push(GroupTable::new(group, teams)?);
    }
    Ok(groups)
}
