//! CSV persistence for historical results, fixture templates and group
//! tables, plus JSON loading of the third-place assignment table.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

use super::normalize;
use crate::tournament::{FixtureRow, GroupId, GroupTable, HistoricalMatch, ThirdPlaceTable};

#[derive(Debug, Serialize, Deserialize)]
struct GroupRecord {
    group: GroupId,
    team: String,
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load historical results (`home,away,homegoals,awaygoals,year`).
pub fn read_history(path: &Path) -> Result<Vec<HistoricalMatch>> {
    let mut matches: Vec<HistoricalMatch> = read_records(path)?;
    for m in &mut matches {
        m.home = normalize::team_name(&m.home);
        m.away = normalize::team_name(&m.away);
    }
    Ok(matches)
}

pub fn write_history(path: &Path, matches: &[HistoricalMatch]) -> Result<()> {
    write_records(path, matches)
}

/// Load the ordered fixture list (`home,score,away,year`).
pub fn read_fixtures(path: &Path) -> Result<Vec<FixtureRow>> {
    Ok(normalize::fixture_rows(read_records(path)?))
}

pub fn write_fixtures(path: &Path, rows: &[FixtureRow]) -> Result<()> {
    write_records(path, rows)
}

/// Load group membership (`group,team`). Groups keep the order in which they
/// first appear, teams keep file order within their group.
pub fn read_groups(path: &Path) -> Result<Vec<GroupTable>> {
    let records: Vec<GroupRecord> = read_records(path)?;
    let mut members: Vec<(GroupId, Vec<String>)> = Vec::new();
    for record in records {
        let team = normalize::team_name(&record.team);
        match members.iter_mut().find(|(g, _)| *g == record.group) {
            Some((_, teams)) => teams.push(team),
            None => members.push((record.group, vec![team])),
        }
    }
    members
        .into_iter()
        .map(|(group, teams)| {
            GroupTable::new(group, teams)
                .with_context(|| format!("Invalid group table in {}", path.display()))
        })
        .collect()
}

pub fn write_groups(path: &Path, groups: &[GroupTable]) -> Result<()> {
    let records: Vec<GroupRecord> = groups
        .iter()
        .flat_map(|g| {
            g.rows.iter().map(move |r| GroupRecord {
                group: g.group,
                team: r.team.clone(),
            })
        })
        .collect();
    write_records(path, &records)
}

pub fn read_third_place_table(path: &Path) -> Result<ThirdPlaceTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid third-place table in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn data_path(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
    }

    #[test]
    fn history_survives_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.csv");
        let matches = vec![
            HistoricalMatch {
                home: "Greece".into(),
                away: "Portugal".into(),
                home_goals: 2,
                away_goals: 1,
                year: 2004,
            },
            HistoricalMatch {
                home: "Portugal".into(),
                away: "Greece".into(),
                home_goals: 0,
                away_goals: 1,
                year: 2004,
            },
        ];
        write_history(&path, &matches).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("home,away,homegoals,awaygoals,year"));
        assert_eq!(read_history(&path).unwrap(), matches);
    }

    #[test]
    fn groups_keep_file_order_and_strip_host_marker() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "group,team").unwrap();
        for line in ["B,Spain", "A,Germany (H)", "B,Italy", "A,Scotland", "A,Hungary", "B,Croatia", "A,Switzerland", "B,Albania"] {
            writeln!(file, "{line}").unwrap();
        }
        let groups = read_groups(file.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group.letter(), 'B');
        assert_eq!(groups[1].rows[0].team, "Germany");
        assert_eq!(groups[1].rows[3].team, "Switzerland");
    }

    #[test]
    fn short_group_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "group,team\nA,Germany\nA,Scotland").unwrap();
        let err = read_groups(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("exactly 4 teams"), "{err:#}");
    }

    #[test]
    fn bundled_euro_2024_data_is_consistent() {
        let groups = read_groups(&data_path("uefa_euro_2024_groups.csv")).unwrap();
        let fixtures = read_fixtures(&data_path("uefa_euro_2024_fixtures.csv")).unwrap();
        let table = read_third_place_table(&data_path("uefa_euro_2024_third_place.json")).unwrap();

        assert_eq!(groups.len(), 6);
        assert_eq!(fixtures.len(), 51);
        assert!(groups[0].contains("Germany"));

        let template = crate::tournament::TournamentTemplate::from_rows(&fixtures, &table).unwrap();
        for f in &template.group_fixtures {
            let group = groups.iter().find(|g| g.contains(&f.home)).unwrap();
            assert!(group.contains(&f.away), "{} vs {}", f.home, f.away);
        }
    }
}
