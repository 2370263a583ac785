use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;
use std::fmt::Display;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `1` / `0`
    Boolean,
    /// Plain numeric values
    Number,
    /// Date/time values stored as serial numbers from the 1900 epoch
    NumberDateTime1900,
    /// Date values stored as serial numbers from the 1900 epoch
    NumberDate1900,
    /// Time values stored as day fractions
    NumberTime1900,
    /// Date/time values stored as serial numbers from the 1904 epoch
    NumberDateTime1904,
    /// Date values stored as serial numbers from the 1904 epoch
    NumberDate1904,
    /// Time values stored as day fractions (1904 workbooks)
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// ISO 8601 duration strings (ods time cells)
    IsoDuration,
    /// Text, inline or resolved from the shared string table
    Text,
    /// Index into the xlsx shared string table, resolved before a cell is stored
    SharedString,
    /// Spreadsheet error values such as `#N/A`
    Error,
}

impl CellType {
    /// Cell type implied by one of the built-in xlsx number format ids.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(Self::date_time(is_1904)),
            "14" | "15" | "16" | "17" => Some(Self::date(is_1904)),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::time(is_1904)),
            _ => None,
        }
    }

    /// Cell type implied by a custom number format code, e.g. `yyyy-mm-dd`.
    /// Quoted literals, escaped characters and bracketed sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,
                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,
                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),
                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time) {
            (true, true) => Self::date_time(is_1904),
            (true, false) => Self::date(is_1904),
            (false, true) => Self::time(is_1904),
            (false, false) => Self::Number,
        }
    }

    fn date_time(is_1904: bool) -> Self {
        if is_1904 {
            Self::NumberDateTime1904
        } else {
            Self::NumberDateTime1900
        }
    }

    fn date(is_1904: bool) -> Self {
        if is_1904 {
            Self::NumberDate1904
        } else {
            Self::NumberDate1900
        }
    }

    fn time(is_1904: bool) -> Self {
        if is_1904 {
            Self::NumberTime1904
        } else {
            Self::NumberTime1900
        }
    }

    /// Short human-readable name used in error messages.
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::NumberDateTime1900 | Self::NumberDateTime1904 => "datetime",
            Self::NumberDate1900 | Self::NumberDate1904 => "date",
            Self::NumberTime1900 | Self::NumberTime1904 => "time",
            Self::IsoDateTime => "datetime",
            Self::IsoDuration => "duration",
            Self::Text | Self::SharedString => "text",
            Self::Error => "error",
        }
    }
}

/// One non-empty cell with its absolute position in the sheet.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    pub(crate) fn text(row: usize, col: usize, value: &str) -> Self {
        Cell {
            row,
            col,
            kind: CellType::Text,
            value: value.to_owned(),
        }
    }

    /// Excel-style reference, e.g. `B2`.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub(crate) fn is_text(&self) -> bool {
        self.kind == CellType::Text
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = match self.kind {
            CellType::Boolean => Some(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::Number => to_number_string(&self.value),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberTime1900 | CellType::NumberTime1904 => to_time_string(&self.value),
            CellType::IsoDateTime => Some(self.value.replace('T', " ")),
            CellType::IsoDuration => to_duration_string(&self.value),
            _ => None,
        };
        // Values that fail to convert are shown as stored
        f.write_str(rendered.as_deref().unwrap_or(&self.value))
    }
}

/// Integral numbers without a fraction, others in shortest round-trip form.
fn to_number_string(value: &str) -> Option<String> {
    let number = value.trim().parse::<f64>().ok()?;
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        Some(format!("{}", number as i64))
    } else {
        Some(format!("{}", number))
    }
}

/// Serial day number to `YYYY-MM-DD`. The 1900 system counts the
/// non-existent 1900-02-29, so serials before 60 are shifted by one day.
fn to_date_string(value: &str, is_1904: bool) -> Option<String> {
    let days = value.trim().parse::<f64>().ok()?.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let days = Duration::try_days(days.checked_add(offset)?)?;
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(days)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Day fraction to `HH:MM:SS`.
fn to_time_string(value: &str) -> Option<String> {
    let fraction = value.trim().parse::<f64>().ok()?.fract();
    let seconds = (fraction * 86_400f64).round() as u32 % 86_400;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(time.format("%H:%M:%S").to_string())
}

/// ISO 8601 duration to `H:MM:SS`, days folded into hours. Durations with
/// years or months have no fixed length and are left as stored.
fn to_duration_string(value: &str) -> Option<String> {
    let duration = value.parse::<IsoDuration>().ok()?;
    if duration.year != 0.0 || duration.month != 0.0 {
        return None;
    }
    let hours = duration.day as f64 * 24.0 + duration.hour as f64;
    let total = ((hours * 60.0 + duration.minute as f64) * 60.0 + duration.second as f64).round() as u64;
    Some(format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60))
}

fn to_datetime_string(value: &str, is_1904: bool) -> Option<String> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Some(format!("{date} {time}"))
}
