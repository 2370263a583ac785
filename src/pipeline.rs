//! # Import Pipeline
//!
//! One linear pass over a workbook: resolve the roster, load the sheets,
//! bind every sheet schema, then derive and stream records into the import
//! files. Nothing is written, the team roster included, until every schema
//! is bound, so configuration and layout problems never leave files behind.
//! Records are streamed, so a bad cell can leave a partially written file.
use crate::classifier::derive::derive_record;
use crate::classifier::derive::OutputField;
use crate::classifier::derive::RunContext;
use crate::classifier::schema::SheetSchema;
use crate::config::ImportConfig;
use crate::config::OutputMode;
use crate::config::RosterConfig;
use crate::emitter::CsvSink;
use crate::emitter::IMPORT_SUFFIX;
use crate::error::ConfigurationError;
use crate::error::ImportError;
use crate::error::ResultMessage;
use crate::roster::Assignee;
use crate::roster::Roster;
use crate::spreadsheet;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;

/// What a run produced.
#[derive(Debug)]
pub(crate) struct ImportSummary {
    pub(crate) owner: Assignee,
    pub(crate) sheets: usize,
    pub(crate) records: usize,
    pub(crate) outputs: Vec<PathBuf>,
}

pub(crate) fn run(config: &ImportConfig) -> Result<ImportSummary, ImportError> {
    let workbook = config.workbook.as_path();
    if !workbook.is_file() {
        Err(ConfigurationError::WorkbookNotFound(workbook.display().to_string()))?;
    }
    let prefix = workbook
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| ConfigurationError::MissingFileName(workbook.display().to_string()))?;

    let team = match &config.roster {
        Some(roster) => Some((roster, load_team(roster)?)),
        None => None,
    };
    let owner = team
        .as_ref()
        .map_or(Assignee::Unassigned, |(roster, members)| members.resolve(&roster.assignee));
    info!(owner = %owner, "resolved default assignee");

    let tables = spreadsheet::load(workbook, config.skip_rows, &config.criteria)?;
    let schemas = tables
        .iter()
        .map(|table| SheetSchema::bind(table, config.policy, &config.layout))
        .collect::<Result<Vec<_>, _>>()?;
    for schema in &schemas {
        debug!(
            sheet = schema.sheet,
            test_type = %schema.test_type,
            rows = schema.row_count(),
            frequency = schema.has_frequency(),
            "bound sheet schema"
        );
    }
    if let Some((roster, members)) = &team {
        write_team(roster, members)?;
    }

    let context = RunContext {
        policy: config.policy,
        owner,
        component: config.component.clone(),
        lenient_flags: config.lenient_flags,
    };
    let fields = OutputField::for_run(&context);
    let directory = config.workspace.join(prefix);
    let mut records = 0usize;
    let mut outputs = Vec::<PathBuf>::new();

    match config.output {
        OutputMode::Combined => {
            let path = directory.join(format!("{prefix}{IMPORT_SUFFIX}"));
            let mut sink = CsvSink::open(&path, fields)?;
            sink.write_header()?;
            for schema in &schemas {
                emit_sheet(schema, &context, &mut sink)?;
            }
            records += sink.close()?;
            outputs.push(path);
        }
        OutputMode::PerSheet => {
            // Sheets that sanitize to the same test type share a file
            let mut sinks = Vec::<CsvSink>::new();
            for schema in &schemas {
                let path = directory.join(format!("{prefix}_{}{IMPORT_SUFFIX}", schema.test_type));
                let index = match sinks.iter().position(|sink| sink.path() == path) {
                    Some(index) => index,
                    None => {
                        let mut sink = CsvSink::open(&path, fields.clone())?;
                        sink.write_header()?;
                        sinks.push(sink);
                        sinks.len() - 1
                    }
                };
                emit_sheet(schema, &context, &mut sinks[index])?;
            }
            for sink in sinks {
                outputs.push(sink.path().to_owned());
                records += sink.close()?;
            }
        }
    }

    Ok(ImportSummary {
        owner: context.owner,
        sheets: schemas.len(),
        records,
        outputs,
    })
}

/// Loads the user export narrowed to the team allow-list.
fn load_team(config: &RosterConfig) -> Result<Roster, ImportError> {
    Ok(Roster::load(&config.export)?.filter_team(&config.team))
}

fn write_team(config: &RosterConfig, team: &Roster) -> Result<(), ImportError> {
    team.write(&config.team_output)
        .with_prefix(&config.team_output.display().to_string())?;
    debug!(members = team.len(), path = %config.team_output.display(), "wrote team roster");
    Ok(())
}

fn emit_sheet(schema: &SheetSchema, context: &RunContext, sink: &mut CsvSink) -> Result<(), ImportError> {
    let mut count = 0usize;
    for row in schema.rows() {
        let record = derive_record(schema, row, context)?;
        sink.append(&record)?;
        count += 1;
    }
    info!(sheet = schema.sheet, test_type = %schema.test_type, records = count, "classified sheet");
    Ok(())
}
