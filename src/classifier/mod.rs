//! # Row Classification
//!
//! Turns the rows of a bound sheet into import records. A sheet is bound to
//! a [`schema::SheetSchema`] once, then [`derive::derive_record`] builds each
//! row's record from the schema, the row index and the run's
//! [`derive::RunContext`]. Priority, precondition, folder and estimate rules
//! come from the configured [`policy::Policy`].
pub(crate) mod derive;
pub(crate) mod policy;
pub(crate) mod schema;

use regex::Regex;
use std::sync::LazyLock;

static NON_TYPE_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z_]+").expect("Hardcode regex pattern"));

/// Test type of a sheet: its name with everything but ASCII letters and
/// underscores removed.
pub(crate) fn sanitize(sheet_name: &str) -> String {
    NON_TYPE_CHARACTERS.replace_all(sheet_name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_everything_outside_letters_and_underscores() {
        assert_eq!(sanitize("SSG_Gain2"), "SSG_Gain");
        assert_eq!(sanitize("Pout (Power) #3"), "PoutPower");
        assert_eq!(sanitize("Ünïcode_Sheet-1"), "ncode_Sheet");
        assert_eq!(sanitize("2024"), "");
    }

    #[test]
    fn is_idempotent() {
        for name in ["SSG_Gain2", "Pout_Power", "  IP3 / OIP3 ", "a_b_c9"] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once);
        }
    }
}
