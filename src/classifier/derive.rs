use crate::classifier::policy::Flags;
use crate::classifier::policy::FolderRule;
use crate::classifier::policy::Policy;
use crate::classifier::schema::ColumnRole;
use crate::classifier::schema::SheetSchema;
use crate::error::DataError;
use crate::error::ImportError;
use crate::roster::Assignee;
use tracing::warn;

/// Status of every imported test case.
const STATUS: &str = "Draft";
const FLAG_SET: &str = "Y";
const SMALL_SIGNAL_GAIN: &str = "SSG";

/// Everything derivation needs besides the sheet itself, fixed for a run.
#[derive(Clone, Debug)]
pub(crate) struct RunContext {
    pub(crate) policy: Policy,
    pub(crate) owner: Assignee,
    pub(crate) component: Option<String>,
    /// Non-text flag cells count as not set instead of failing
    pub(crate) lenient_flags: bool,
}

/// Columns of the import file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputField {
    Labels,
    Name,
    Objective,
    Owner,
    Priority,
    Status,
    EstimatedTime,
    Folder,
    Component,
    Precondition,
}

impl OutputField {
    pub(crate) const fn header(&self) -> &'static str {
        match self {
            Self::Labels => "Labels",
            Self::Name => "Name",
            Self::Objective => "Objective",
            Self::Owner => "Owner",
            Self::Priority => "Priority",
            Self::Status => "Status",
            Self::EstimatedTime => "Estimated Time",
            Self::Folder => "Folder",
            Self::Component => "Component",
            Self::Precondition => "Precondition",
        }
    }

    /// Output columns for a run, in file order.
    pub(crate) fn for_run(context: &RunContext) -> Vec<OutputField> {
        let mut fields = Vec::with_capacity(10);
        if context.policy.has_precondition() {
            fields.push(Self::Labels);
        }
        fields.extend([
            Self::Name,
            Self::Objective,
            Self::Owner,
            Self::Priority,
            Self::Status,
            Self::EstimatedTime,
            Self::Folder,
        ]);
        if context.component.is_some() {
            fields.push(Self::Component);
        }
        if context.policy.has_precondition() {
            fields.push(Self::Precondition);
        }
        fields
    }
}

/// One test case ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DerivedRecord {
    pub(crate) label: Option<String>,
    pub(crate) name: String,
    pub(crate) objective: String,
    pub(crate) owner: String,
    pub(crate) priority: &'static str,
    pub(crate) status: &'static str,
    pub(crate) estimate: &'static str,
    pub(crate) folder: String,
    pub(crate) component: Option<String>,
    pub(crate) precondition: Option<&'static str>,
}

impl DerivedRecord {
    pub(crate) fn value(&self, field: OutputField) -> &str {
        match field {
            OutputField::Labels => self.label.as_deref().unwrap_or_default(),
            OutputField::Name => &self.name,
            OutputField::Objective => &self.objective,
            OutputField::Owner => &self.owner,
            OutputField::Priority => self.priority,
            OutputField::Status => self.status,
            OutputField::EstimatedTime => self.estimate,
            OutputField::Folder => &self.folder,
            OutputField::Component => self.component.as_deref().unwrap_or_default(),
            OutputField::Precondition => self.precondition.unwrap_or_default(),
        }
    }

    pub(crate) fn values(&self, fields: &[OutputField]) -> Vec<&str> {
        fields.iter().map(|field| self.value(*field)).collect()
    }
}

/// Folder of a test type. `SSG_<x>` always maps to `Small Signal Gain: <x>`;
/// the generic rule turns `<a>_<b>` into `<a>: <b>`.
pub(crate) fn folder(test_type: &str, rule: FolderRule, component: Option<&str>) -> String {
    let fragments: Vec<&str> = test_type.split('_').collect();
    let folder = match (rule, fragments.as_slice()) {
        (_, [first, second, ..]) if first.contains(SMALL_SIGNAL_GAIN) => format!("Small Signal Gain: {second}"),
        (FolderRule::SmallSignalGainOnly, _) => String::new(),
        (FolderRule::Generic, [first, second, ..]) => format!("{first}: {second}"),
        (FolderRule::Generic, [first]) => first.to_string(),
        (FolderRule::Generic, []) => String::new(),
    };
    match component {
        Some(component) if !folder.is_empty() => format!("{folder} ({component})"),
        _ => folder,
    }
}

pub(crate) fn objective(test_type: &str, chip: &str, volt: &str, temp: &str, frequency: Option<&str>) -> String {
    match frequency {
        Some(frequency) => format!(
            "Measure {test_type} of the {chip} over frequency range {frequency} at ({temp}) degrees C and ({volt})V"
        ),
        None => format!("Measure {test_type} of the {chip} at ({temp}) degrees C and ({volt})V"),
    }
}

/// Derives the record of data row `row`. Depends only on its arguments.
pub(crate) fn derive_record(
    schema: &SheetSchema,
    row: usize,
    context: &RunContext,
) -> Result<DerivedRecord, ImportError> {
    let number = required_value(schema, ColumnRole::Number, row)?;
    let chip = required_value(schema, ColumnRole::Chip, row)?;
    let volt = required_value(schema, ColumnRole::Voltage, row)?;
    let temp = required_value(schema, ColumnRole::Temperature, row)?;
    let frequency = schema
        .cell(ColumnRole::Frequency, row)
        .map(|cell| cell.to_string());
    let test_type = &schema.test_type;
    let policy = context.policy;

    let flags = match policy {
        Policy::Precondition => Flags {
            mk1: flag(schema, ColumnRole::Mk1, row, context.lenient_flags)?,
            baseline: false,
        },
        Policy::Baseline => Flags {
            mk1: flag(schema, ColumnRole::Mk1, row, context.lenient_flags)?,
            baseline: flag(schema, ColumnRole::Baseline, row, context.lenient_flags)?,
        },
        Policy::Uniform => Flags::default(),
    };
    let classification = policy.classify(flags);
    let label = policy.has_precondition().then(|| {
        schema
            .cell(ColumnRole::Label, row)
            .map(|cell| cell.to_string())
            .unwrap_or_default()
    });

    Ok(DerivedRecord {
        label,
        name: format!("{test_type}{number}_{chip}_{volt}_{temp}"),
        objective: objective(test_type, &chip, &volt, &temp, frequency.as_deref()),
        owner: context.owner.to_string(),
        priority: classification.priority,
        status: STATUS,
        estimate: policy.estimate(),
        folder: folder(test_type, policy.folder_rule(), context.component.as_deref()),
        component: context.component.clone(),
        precondition: classification.precondition,
    })
}

fn required_value(schema: &SheetSchema, role: ColumnRole, row: usize) -> Result<String, ImportError> {
    match schema.cell(role, row) {
        Some(cell) => Ok(cell.to_string()),
        None => Err(DataError::MissingValue {
            sheet: schema.sheet.to_owned(),
            row,
            role: role.as_str(),
        }
        .into()),
    }
}

/// Whether the flag cell holds exactly `Y`. Empty cells are not set; cells
/// that are not text are rejected unless `lenient`.
fn flag(schema: &SheetSchema, role: ColumnRole, row: usize, lenient: bool) -> Result<bool, ImportError> {
    let cell = match schema.cell(role, row) {
        Some(cell) => cell,
        None => return Ok(false),
    };
    if cell.is_text() {
        return Ok(cell.value == FLAG_SET);
    }
    if lenient {
        warn!(
            sheet = schema.sheet,
            cell = %cell.reference(),
            role = role.as_str(),
            kind = cell.kind.as_str(),
            value = %cell.value,
            "flag is not text, treating as not set"
        );
        return Ok(false);
    }
    Err(DataError::InvalidFlag {
        sheet: schema.sheet.to_owned(),
        reference: cell.reference(),
        role: role.as_str(),
        kind: cell.kind.as_str(),
        value: cell.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::schema::ColumnLayout;
    use crate::spreadsheet::cell::Cell;
    use crate::spreadsheet::cell::CellType;
    use crate::spreadsheet::sheet::Sheet;
    use crate::spreadsheet::table::SheetTable;

    const HEADERS: [&str; 8] = ["No", "Chip", "Description", "Label", "Voltage", "Temp", "Flag", "Mk1"];

    /// Header row 0, then one sheet row per entry. `None` leaves the cell
    /// empty and numbers are stored as number cells.
    fn table(name: &str, headers: &[&str], rows: &[&[Option<&str>]]) -> SheetTable {
        let mut sheet = Sheet::new("plan.xlsx", name, None);
        for (col, header) in headers.iter().enumerate() {
            sheet.push(Cell::text(0, col, header));
        }
        for (index, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                if let Some(value) = value {
                    let kind = if value.parse::<f64>().is_ok() {
                        CellType::Number
                    } else {
                        CellType::Text
                    };
                    sheet.push(Cell {
                        row: index + 1,
                        col,
                        kind,
                        value: value.to_string(),
                    });
                }
            }
        }
        SheetTable::from_sheet(sheet, 0)
    }

    fn context(policy: Policy) -> RunContext {
        RunContext {
            policy,
            owner: Assignee::User("u1".to_owned()),
            component: None,
            lenient_flags: false,
        }
    }

    fn derive_all(table: &SheetTable, context: &RunContext) -> Result<Vec<DerivedRecord>, ImportError> {
        let schema = SheetSchema::bind(table, context.policy, &ColumnLayout::default())?;
        schema.rows().map(|row| derive_record(&schema, row, context)).collect()
    }

    #[test]
    fn sanitized_ssg_sheet_gets_small_signal_gain_folder() {
        let table = table(
            "SSG_Gain2",
            &HEADERS,
            &[&[Some("1"), Some("U1"), None, Some("LNA"), Some("3.3"), Some("25"), None, Some("Y")]],
        );
        let records = derive_all(&table, &context(Policy::Precondition)).unwrap();

        assert_eq!(
            records,
            vec![DerivedRecord {
                label: Some("LNA".to_owned()),
                name: "SSG_Gain1_U1_3.3_25".to_owned(),
                objective: "Measure SSG_Gain of the U1 at (25) degrees C and (3.3)V".to_owned(),
                owner: "u1".to_owned(),
                priority: "High",
                status: "Draft",
                estimate: "08:00",
                folder: "Small Signal Gain: Gain".to_owned(),
                component: None,
                precondition: Some("Mk1"),
            }]
        );
    }

    #[test]
    fn precondition_policy_defaults_to_low_baseline() {
        let table = table(
            "Pout_Power",
            &HEADERS,
            &[
                &[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), None, Some("N")],
                &[Some("2"), Some("U2"), None, None, Some("5"), Some("-40"), None, None],
            ],
        );
        let records = derive_all(&table, &context(Policy::Precondition)).unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.priority, "Low");
            assert_eq!(record.precondition, Some("Baseline"));
            assert_eq!(record.label.as_deref(), Some(""));
            assert_eq!(record.folder, "");
        }
        assert_eq!(records[1].name, "Pout_Power2_U2_5_-40");
    }

    #[test]
    fn baseline_policy_uses_generic_folders_and_both_flags() {
        let table = table(
            "Pout_Power",
            &HEADERS,
            &[
                &[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), Some("Y"), Some("Y")],
                &[Some("2"), Some("U1"), None, None, Some("3.3"), Some("85"), Some("Y"), None],
                &[Some("3"), Some("U1"), None, None, Some("3.3"), Some("125"), None, Some("y")],
            ],
        );
        let records = derive_all(&table, &context(Policy::Baseline)).unwrap();

        let priorities: Vec<&str> = records.iter().map(|record| record.priority).collect();
        assert_eq!(priorities, vec!["Mk1", "Baseline", "Low"]);
        assert!(records.iter().all(|record| record.folder == "Pout: Power"));
        assert!(records.iter().all(|record| record.estimate == "1:00"));
        assert!(records.iter().all(|record| record.precondition.is_none() && record.label.is_none()));
    }

    #[test]
    fn baseline_policy_reads_numeric_frequency_as_text_not_flag() {
        let headers = ["No", "Chip", "x", "Label", "Voltage", "Temp", "Frequency", "Mk1"];
        let table = table(
            "Pout_Power",
            &headers,
            &[
                &[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), Some("2.4"), None],
                &[Some("2"), Some("U1"), None, None, Some("3.3"), Some("25"), Some("Y"), Some("Y")],
            ],
        );
        let records = derive_all(&table, &context(Policy::Baseline)).unwrap();

        assert_eq!(
            records[0].objective,
            "Measure Pout_Power of the U1 over frequency range 2.4 at (25) degrees C and (3.3)V"
        );
        assert_eq!(records[0].priority, "Low");
        assert_eq!(records[1].priority, "Mk1");
    }

    #[test]
    fn frequency_column_extends_the_objective() {
        let headers = ["No", "Chip", "x", "Label", "Voltage", "Temp", "Frequency", "Mk1"];
        let table = table(
            "Gain",
            &headers,
            &[
                &[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), Some("1-6GHz"), None],
                &[Some("2"), Some("U1"), None, None, Some("3.3"), Some("25"), None, None],
            ],
        );
        let records = derive_all(&table, &context(Policy::Uniform)).unwrap();

        assert_eq!(
            records[0].objective,
            "Measure Gain of the U1 over frequency range 1-6GHz at (25) degrees C and (3.3)V"
        );
        assert_eq!(records[1].objective, "Measure Gain of the U1 at (25) degrees C and (3.3)V");
        assert_eq!(records[0].priority, "Normal");
        assert_eq!(records[0].folder, "Gain");
    }

    #[test]
    fn component_suffixes_non_empty_folders() {
        assert_eq!(
            folder("SSG_Gain", FolderRule::SmallSignalGainOnly, Some("LNA")),
            "Small Signal Gain: Gain (LNA)"
        );
        assert_eq!(folder("Pout_Power", FolderRule::SmallSignalGainOnly, Some("LNA")), "");
        assert_eq!(folder("Pout_Power", FolderRule::Generic, Some("PA")), "Pout: Power (PA)");
        assert_eq!(folder("SSG", FolderRule::Generic, None), "SSG");
    }

    #[test]
    fn records_count_matches_voltage_rows() {
        let table = table(
            "Gain",
            &HEADERS,
            &[
                &[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), None, None],
                &[None, None, None, None, None, None, None, None],
                &[Some("note"), None, None, None, None, None, None, None],
                &[Some("3"), Some("U1"), None, None, Some("5"), Some("25"), None, None],
            ],
        );
        let records = derive_all(&table, &context(Policy::Uniform)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_required_value_is_a_data_error() {
        let table = table(
            "Gain",
            &HEADERS,
            &[&[Some("1"), None, None, None, Some("3.3"), Some("25"), None, None]],
        );
        let error = derive_all(&table, &context(Policy::Uniform)).unwrap_err();
        assert!(matches!(
            error,
            ImportError::DataError(DataError::MissingValue { role: "chip", row: 0, .. })
        ));
    }

    #[test]
    fn numeric_flag_fails_unless_lenient() {
        let table = table(
            "Gain",
            &HEADERS,
            &[&[Some("1"), Some("U1"), None, None, Some("3.3"), Some("25"), None, Some("1")]],
        );
        let error = derive_all(&table, &context(Policy::Precondition)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Data error: Sheet 'Gain' cell H2: Mk1 flag must be text, found number '1'"
        );

        let lenient = RunContext {
            lenient_flags: true,
            ..context(Policy::Precondition)
        };
        let records = derive_all(&table, &lenient).unwrap();
        assert_eq!(records[0].priority, "Low");
    }

    #[test]
    fn output_fields_follow_policy_and_component() {
        let headers = |run: &RunContext| -> Vec<&'static str> {
            OutputField::for_run(run).iter().map(OutputField::header).collect()
        };
        assert_eq!(
            headers(&RunContext {
                component: Some("LNA".to_owned()),
                ..context(Policy::Precondition)
            }),
            vec![
                "Labels",
                "Name",
                "Objective",
                "Owner",
                "Priority",
                "Status",
                "Estimated Time",
                "Folder",
                "Component",
                "Precondition"
            ]
        );
        assert_eq!(
            headers(&context(Policy::Baseline)),
            vec!["Name", "Objective", "Owner", "Priority", "Status", "Estimated Time", "Folder"]
        );
    }
}
