use crate::spreadsheet::range::Range;
use glob::Pattern;

/// Sheet names that never hold test cases: default placeholder sheets and
/// the glossary sheets test plans carry.
pub(crate) const DEFAULT_EXCLUDED_SHEETS: [&str; 2] = ["Sheet*", "*Definitions*"];

/// Criteria for selecting sheets and the area to read within them.
#[derive(Clone, Debug)]
pub(crate) struct Criteria {
    /// When present, only sheets matching one of these patterns are read.
    pub(crate) sheet_name_patterns: Option<Vec<Pattern>>,

    /// Sheets matching any of these patterns are never read.
    pub(crate) excluded_sheet_patterns: Vec<Pattern>,

    /// Data range within sheets to extract.
    pub(crate) range: Option<Range>,

    /// Treat error cells (`#N/A`, `#REF!`) as empty instead of failing.
    pub(crate) error_as_null: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            sheet_name_patterns: None,
            excluded_sheet_patterns: DEFAULT_EXCLUDED_SHEETS
                .iter()
                .map(|pattern| Pattern::new(pattern).expect("Hardcode glob pattern"))
                .collect(),
            range: None,
            error_as_null: false,
        }
    }
}

impl Criteria {
    /// Checks if a sheet should be read.
    /// Exclusions win over the inclusion patterns.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        if self.excluded_sheet_patterns.iter().any(|pattern| pattern.matches(sheet_name)) {
            return false;
        }
        match &self.sheet_name_patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }
}
