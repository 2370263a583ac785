use crate::classifier::policy::Policy;
use crate::classifier::sanitize;
use crate::error::ImportError;
use crate::error::SchemaError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::table::Column;
use crate::spreadsheet::table::SheetTable;

/// Header that switches the objective to the frequency-range form.
const FREQUENCY_HEADER: &str = "Frequency";

/// What a column means to the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColumnRole {
    Number,
    Chip,
    Label,
    Voltage,
    Temperature,
    Frequency,
    Baseline,
    Mk1,
}

impl ColumnRole {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "test number",
            Self::Chip => "chip",
            Self::Label => "type label",
            Self::Voltage => "voltage",
            Self::Temperature => "temperature",
            Self::Frequency => "frequency",
            Self::Baseline => "baseline flag",
            Self::Mk1 => "Mk1 flag",
        }
    }
}

/// Positions of each role in a sheet's meaningful column list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColumnLayout {
    pub(crate) number: usize,
    pub(crate) chip: usize,
    pub(crate) label: usize,
    pub(crate) voltage: usize,
    pub(crate) temperature: usize,
    pub(crate) frequency: usize,
    pub(crate) baseline: usize,
    pub(crate) mk1: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            number: 0,
            chip: 1,
            label: 3,
            voltage: 4,
            temperature: 5,
            frequency: 6,
            baseline: 6,
            mk1: 7,
        }
    }
}

impl ColumnLayout {
    pub(crate) const fn position(&self, role: ColumnRole) -> usize {
        match role {
            ColumnRole::Number => self.number,
            ColumnRole::Chip => self.chip,
            ColumnRole::Label => self.label,
            ColumnRole::Voltage => self.voltage,
            ColumnRole::Temperature => self.temperature,
            ColumnRole::Frequency => self.frequency,
            ColumnRole::Baseline => self.baseline,
            ColumnRole::Mk1 => self.mk1,
        }
    }
}

/// A sheet's columns bound to roles. Binding happens once per sheet so
/// that derivation only ever reads by role.
#[derive(Debug)]
pub(crate) struct SheetSchema<'a> {
    pub(crate) sheet: &'a str,
    /// Sanitized sheet name shared by every record of the sheet
    pub(crate) test_type: String,
    number: &'a Column,
    chip: &'a Column,
    voltage: &'a Column,
    temperature: &'a Column,
    label: Option<&'a Column>,
    frequency: Option<&'a Column>,
    baseline: Option<&'a Column>,
    mk1: Option<&'a Column>,
}

impl<'a> SheetSchema<'a> {
    /// Binds the meaningful columns of `table` to the roles `policy` reads.
    /// Fails when a required role points past the last meaningful column.
    pub(crate) fn bind(table: &'a SheetTable, policy: Policy, layout: &ColumnLayout) -> Result<Self, ImportError> {
        let columns = table.meaningful_columns();
        let required = |role: ColumnRole| -> Result<&'a Column, ImportError> {
            let position = layout.position(role);
            columns.get(position).copied().ok_or_else(|| {
                SchemaError::MissingColumn {
                    sheet: table.name.to_owned(),
                    role: role.as_str(),
                    position,
                    available: columns.len(),
                }
                .into()
            })
        };
        let by_policy = |role: ColumnRole| -> Result<Option<&'a Column>, ImportError> {
            if policy.required_roles().contains(&role) {
                required(role).map(Some)
            } else {
                Ok(None)
            }
        };
        let frequency = if columns.iter().any(|column| column.header == FREQUENCY_HEADER) {
            Some(required(ColumnRole::Frequency)?)
        } else {
            None
        };
        // A frequency column sitting at the baseline position holds no flags
        let baseline = match by_policy(ColumnRole::Baseline)? {
            Some(column) if frequency.is_some_and(|frequency| std::ptr::eq(frequency, column)) => None,
            baseline => baseline,
        };

        Ok(SheetSchema {
            sheet: &table.name,
            test_type: sanitize(&table.name),
            number: required(ColumnRole::Number)?,
            chip: required(ColumnRole::Chip)?,
            voltage: required(ColumnRole::Voltage)?,
            temperature: required(ColumnRole::Temperature)?,
            label: by_policy(ColumnRole::Label)?,
            frequency,
            baseline,
            mk1: by_policy(ColumnRole::Mk1)?,
        })
    }

    pub(crate) fn column(&self, role: ColumnRole) -> Option<&'a Column> {
        match role {
            ColumnRole::Number => Some(self.number),
            ColumnRole::Chip => Some(self.chip),
            ColumnRole::Voltage => Some(self.voltage),
            ColumnRole::Temperature => Some(self.temperature),
            ColumnRole::Label => self.label,
            ColumnRole::Frequency => self.frequency,
            ColumnRole::Baseline => self.baseline,
            ColumnRole::Mk1 => self.mk1,
        }
    }

    /// Cell of `role` in data row `row`, `None` when the role is unbound or
    /// the cell is empty.
    pub(crate) fn cell(&self, role: ColumnRole, row: usize) -> Option<&'a Cell> {
        self.column(role).and_then(|column| column.get(row))
    }

    pub(crate) fn has_frequency(&self) -> bool {
        self.frequency.is_some()
    }

    /// Data rows with a voltage, ascending. Every one of them is a test case.
    pub(crate) fn rows(&self) -> impl Iterator<Item = usize> + 'a {
        let voltage = self.voltage;
        voltage.cells.keys().copied()
    }

    pub(crate) fn row_count(&self) -> usize {
        self.voltage.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::sheet::Sheet;

    fn table(name: &str, headers: &[&str]) -> SheetTable {
        let mut sheet = Sheet::new("plan.xlsx", name, None);
        for (col, header) in headers.iter().enumerate() {
            if !header.is_empty() {
                sheet.push(Cell::text(0, col, header));
            }
        }
        sheet.push(Cell::text(1, 0, "1"));
        SheetTable::from_sheet(sheet, 0)
    }

    const FULL: [&str; 10] = [
        "No",
        "Chip",
        "Unnamed: 2",
        "Description",
        "Label",
        "Voltage",
        "Temp",
        "",
        "Frequency",
        "Mk1",
    ];

    #[test]
    fn binds_roles_around_placeholder_columns() {
        let table = table("SSG_Gain2", &FULL);
        let schema = SheetSchema::bind(&table, Policy::Precondition, &ColumnLayout::default()).unwrap();

        assert_eq!(schema.test_type, "SSG_Gain");
        assert_eq!(schema.column(ColumnRole::Chip).unwrap().header, "Chip");
        assert_eq!(schema.column(ColumnRole::Label).unwrap().header, "Label");
        assert_eq!(schema.column(ColumnRole::Voltage).unwrap().header, "Voltage");
        assert_eq!(schema.column(ColumnRole::Frequency).unwrap().header, "Frequency");
        assert_eq!(schema.column(ColumnRole::Mk1).unwrap().header, "Mk1");
        assert!(schema.column(ColumnRole::Baseline).is_none());
    }

    #[test]
    fn frequency_is_bound_only_when_headed_frequency() {
        let table = table("Pout_Power", &["No", "Chip", "x", "Label", "Voltage", "Temp", "Base", "Mk1"]);
        let schema = SheetSchema::bind(&table, Policy::Baseline, &ColumnLayout::default()).unwrap();

        assert!(!schema.has_frequency());
        assert_eq!(schema.column(ColumnRole::Baseline).unwrap().header, "Base");
        assert!(schema.column(ColumnRole::Label).is_none());
    }

    #[test]
    fn frequency_column_is_never_read_as_baseline() {
        let table = table("Pout_Power", &["No", "Chip", "x", "Label", "Voltage", "Temp", "Frequency", "Mk1"]);
        let schema = SheetSchema::bind(&table, Policy::Baseline, &ColumnLayout::default()).unwrap();

        assert_eq!(schema.column(ColumnRole::Frequency).unwrap().header, "Frequency");
        assert!(schema.column(ColumnRole::Baseline).is_none());
        assert_eq!(schema.column(ColumnRole::Mk1).unwrap().header, "Mk1");
    }

    #[test]
    fn missing_required_column_names_sheet_and_role() {
        let table = table("Pout_Power", &["No", "Chip", "x", "Label", "Voltage", "Temp"]);

        let uniform = SheetSchema::bind(&table, Policy::Uniform, &ColumnLayout::default());
        assert!(uniform.is_ok());

        let error = SheetSchema::bind(&table, Policy::Precondition, &ColumnLayout::default()).unwrap_err();
        match error {
            ImportError::SchemaError(SchemaError::MissingColumn {
                sheet,
                role,
                position,
                available,
            }) => {
                assert_eq!(sheet, "Pout_Power");
                assert_eq!(role, "Mk1 flag");
                assert_eq!(position, 7);
                assert_eq!(available, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rows_follow_the_voltage_column() {
        let mut sheet = Sheet::new("plan.xlsx", "Gain", None);
        for (col, header) in ["No", "Chip", "x", "Label", "Voltage", "Temp"].iter().enumerate() {
            sheet.push(Cell::text(0, col, header));
        }
        sheet.push(Cell::text(1, 4, "3.3"));
        sheet.push(Cell::text(2, 0, "2"));
        sheet.push(Cell::text(3, 4, "5.0"));
        let table = SheetTable::from_sheet(sheet, 0);

        let schema = SheetSchema::bind(&table, Policy::Uniform, &ColumnLayout::default()).unwrap();
        assert_eq!(schema.rows().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(schema.row_count(), 2);
    }
}
