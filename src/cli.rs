use crate::classifier::policy::Policy;
use crate::config::ImportConfig;
use crate::config::OutputMode;
use crate::config::RosterConfig;
use crate::config::DEFAULT_SKIP_ROWS;
use crate::error::ConfigurationError;
use crate::error::ImportError;
use crate::error::ResultMessage;
use clap::Parser;
use glob::Pattern;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "testplan-import",
    version,
    about = "Convert test-plan workbooks into Zephyr import CSV files"
)]
pub(crate) struct Cli {
    /// Directory holding the workbook, the roster export and the outputs
    pub(crate) workspace: PathBuf,

    /// Workbook file (.xlsx, .xlsm or .ods), relative to the workspace
    pub(crate) workbook: PathBuf,

    /// Rows above the header row
    #[arg(long, default_value_t = DEFAULT_SKIP_ROWS)]
    pub(crate) skip_rows: usize,

    #[arg(long, value_enum, default_value_t = Policy::Precondition)]
    pub(crate) policy: Policy,

    /// Component name appended to folders and written as its own column
    #[arg(long)]
    pub(crate) component: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputMode::Combined)]
    pub(crate) output: OutputMode,

    /// User export CSV [default: <WORKSPACE>/JIRA Users Export.csv]
    #[arg(long, conflicts_with = "no_roster")]
    pub(crate) roster: Option<PathBuf>,

    /// Skip roster lookup and leave test cases unassigned
    #[arg(long, default_value_t = false)]
    pub(crate) no_roster: bool,

    /// Team roster CSV to write [default: <WORKSPACE>/RFIT.csv]
    #[arg(long)]
    pub(crate) team_roster: Option<PathBuf>,

    /// Team member name fragment, repeatable [default: the RF test team]
    #[arg(long = "team")]
    pub(crate) team: Vec<String>,

    /// Name fragment of the default assignee [default: Sailesh]
    #[arg(long)]
    pub(crate) assignee: Option<String>,

    /// Extra sheet name glob to skip, repeatable
    #[arg(long = "exclude-sheet")]
    pub(crate) exclude_sheets: Vec<String>,

    /// Only read sheets matching this glob, repeatable
    #[arg(long = "sheet")]
    pub(crate) sheets: Vec<String>,

    /// Treat non-text flag cells as not set instead of failing
    #[arg(long, default_value_t = false)]
    pub(crate) lenient_flags: bool,

    /// Treat spreadsheet error cells (#N/A, #REF!) as empty
    #[arg(long, default_value_t = false)]
    pub(crate) error_as_empty: bool,
}

impl Cli {
    pub(crate) fn into_config(self) -> Result<ImportConfig, ImportError> {
        let mut config = ImportConfig::new(&self.workspace, &self.workbook);
        config.skip_rows = self.skip_rows;
        config.policy = self.policy;
        config.component = self.component;
        config.output = self.output;
        config.lenient_flags = self.lenient_flags;

        config.roster = if self.no_roster {
            None
        } else {
            let mut roster = RosterConfig::in_workspace(&self.workspace);
            if let Some(export) = self.roster {
                roster.export = export;
            }
            if let Some(team_output) = self.team_roster {
                roster.team_output = team_output;
            }
            if !self.team.is_empty() {
                roster.team = self.team;
            }
            if let Some(assignee) = self.assignee {
                roster.assignee = assignee;
            }
            Some(roster)
        };

        for pattern in &self.exclude_sheets {
            config
                .criteria
                .excluded_sheet_patterns
                .push(parse_pattern(pattern).with_prefix("--exclude-sheet")?);
        }
        if !self.sheets.is_empty() {
            let patterns = self
                .sheets
                .iter()
                .map(|pattern| parse_pattern(pattern).with_prefix("--sheet"))
                .collect::<Result<Vec<_>, _>>()?;
            config.criteria.sheet_name_patterns = Some(patterns);
        }
        config.criteria.error_as_null = self.error_as_empty;
        Ok(config)
    }
}

fn parse_pattern(pattern: &str) -> Result<Pattern, ImportError> {
    Pattern::new(pattern)
        .map_err(|error| ConfigurationError::InvalidSheetPattern(pattern.to_owned(), error.msg.to_owned()).into())
}
