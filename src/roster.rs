//! # Roster Resolution
//!
//! Loads the user export (`User name`, `User id`), narrows it to the team
//! allow-list and picks the default assignee for every generated test case.
use crate::error::ConfigurationError;
use crate::error::ImportError;
use crate::error::SchemaError;
use csv::ReaderBuilder;
use csv::Trim;
use csv::WriterBuilder;
use serde::Deserialize;
use std::fmt;
use std::fmt::Display;
use std::path::Path;
use tracing::debug;

const NAME_COLUMN: &str = "User name";
const ID_COLUMN: &str = "User id";

/// Owner written when no roster entry matches.
pub(crate) const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "User name")]
    name: String,
    #[serde(rename = "User id")]
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RosterEntry {
    pub(crate) name: String,
    pub(crate) id: String,
}

impl RosterEntry {
    pub(crate) fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        RosterEntry {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// The owner of generated test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Assignee {
    User(String),
    Unassigned,
}

impl Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignee::User(id) => f.write_str(id),
            Assignee::Unassigned => f.write_str(UNASSIGNED),
        }
    }
}

/// Users in first-seen name order. A name seen twice keeps its first
/// position and its last id.
#[derive(Debug, Default)]
pub(crate) struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub(crate) fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut roster = Roster::default();
        for entry in entries {
            match roster.entries.iter_mut().find(|known| known.name == entry.name) {
                Some(known) => known.id = entry.id,
                None => roster.entries.push(entry),
            }
        }
        roster
    }

    /// Reads a user export. Columns other than `User name` and `User id`
    /// are ignored.
    pub(crate) fn load(path: &Path) -> Result<Roster, ImportError> {
        let file = path.display().to_string();
        if !path.is_file() {
            Err(ConfigurationError::RosterNotFound(file.to_owned()))?;
        }
        let mut reader = ReaderBuilder::new().trim(Trim::Headers).from_path(path)?;
        let headers = reader.headers()?.clone();
        for column in [NAME_COLUMN, ID_COLUMN] {
            if !headers.iter().any(|header| header == column) {
                Err(SchemaError::MissingRosterColumn {
                    file: file.to_owned(),
                    column,
                })?;
            }
        }
        let mut rows = Vec::new();
        for result in reader.deserialize::<RosterRow>() {
            let row = result?;
            rows.push(RosterEntry::new(row.name, row.id));
        }
        let roster = Roster::from_entries(rows);
        debug!(file = %file, users = roster.len(), "loaded roster");
        Ok(roster)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries whose name contains any of the member fragments.
    pub(crate) fn filter_team<S: AsRef<str>>(&self, members: &[S]) -> Roster {
        let entries = self
            .entries
            .iter()
            .filter(|entry| members.iter().any(|member| entry.name.contains(member.as_ref())))
            .cloned()
            .collect();
        Roster { entries }
    }

    /// Writes `name,id` rows without a header line.
    pub(crate) fn write(&self, path: &Path) -> Result<(), ImportError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
        for entry in &self.entries {
            writer.write_record([&entry.name, &entry.id])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Ids of every entry whose name contains `target`, joined in roster
    /// order. Matching is case-sensitive.
    pub(crate) fn resolve(&self, target: &str) -> Assignee {
        let id: String = self
            .entries
            .iter()
            .filter(|entry| entry.name.contains(target))
            .map(|entry| entry.id.as_str())
            .collect();
        if id.is_empty() {
            Assignee::Unassigned
        } else {
            Assignee::User(id)
        }
    }
}
