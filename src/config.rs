//! Run configuration, built once from the command line and passed down.
use crate::classifier::policy::Policy;
use crate::classifier::schema::ColumnLayout;
use crate::spreadsheet::criteria::Criteria;
use clap::ValueEnum;
use std::path::Path;
use std::path::PathBuf;

/// Rows above the header row in the standard test-plan template.
pub(crate) const DEFAULT_SKIP_ROWS: usize = 4;
pub(crate) const DEFAULT_ROSTER_FILE: &str = "JIRA Users Export.csv";
pub(crate) const DEFAULT_TEAM_ROSTER_FILE: &str = "RFIT.csv";
pub(crate) const DEFAULT_TEAM: [&str; 7] = ["Sarmad", "Themba", "Aish", "Sailesh", "Jun", "Hassan", "Vikas"];
pub(crate) const DEFAULT_ASSIGNEE: &str = "Sailesh";

/// Where records go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputMode {
    /// One import file for the whole workbook
    #[default]
    Combined,
    /// One import file per sheet
    PerSheet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RosterConfig {
    /// User export to read
    pub(crate) export: PathBuf,
    /// Team roster to write
    pub(crate) team_output: PathBuf,
    /// Name fragments of team members
    pub(crate) team: Vec<String>,
    /// Name fragment of the default assignee
    pub(crate) assignee: String,
}

impl RosterConfig {
    pub(crate) fn in_workspace(workspace: &Path) -> Self {
        RosterConfig {
            export: workspace.join(DEFAULT_ROSTER_FILE),
            team_output: workspace.join(DEFAULT_TEAM_ROSTER_FILE),
            team: DEFAULT_TEAM.iter().map(|member| member.to_string()).collect(),
            assignee: DEFAULT_ASSIGNEE.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ImportConfig {
    pub(crate) workspace: PathBuf,
    /// Workbook path, relative paths resolved against the workspace
    pub(crate) workbook: PathBuf,
    pub(crate) skip_rows: usize,
    pub(crate) policy: Policy,
    pub(crate) component: Option<String>,
    pub(crate) output: OutputMode,
    /// `None` leaves every test case unassigned
    pub(crate) roster: Option<RosterConfig>,
    pub(crate) criteria: Criteria,
    pub(crate) lenient_flags: bool,
    pub(crate) layout: ColumnLayout,
}

impl ImportConfig {
    pub(crate) fn new(workspace: &Path, workbook: &Path) -> Self {
        ImportConfig {
            workspace: workspace.to_owned(),
            workbook: workspace.join(workbook),
            skip_rows: DEFAULT_SKIP_ROWS,
            policy: Policy::default(),
            component: None,
            output: OutputMode::default(),
            roster: Some(RosterConfig::in_workspace(workspace)),
            criteria: Criteria::default(),
            lenient_flags: false,
            layout: ColumnLayout::default(),
        }
    }
}
