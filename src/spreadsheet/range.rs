/// Cell area a sheet read is restricted to. `None` bounds are open.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Range {
    /// Lower row bound (0-based, inclusive)
    pub(crate) row_lower_bound: Option<usize>,
    /// Upper row bound (0-based, inclusive)
    pub(crate) row_upper_bound: Option<usize>,
    /// Lower column bound (0-based, inclusive)
    pub(crate) col_lower_bound: Option<usize>,
    /// Upper column bound (0-based, inclusive)
    pub(crate) col_upper_bound: Option<usize>,
}

impl Range {
    /// Everything from `row` downwards.
    pub(crate) fn from_row(row: usize) -> Self {
        Range {
            row_lower_bound: Some(row),
            ..Default::default()
        }
    }
}
