use crate::classifier::schema::ColumnRole;
use clap::ValueEnum;

const HIGH: &str = "High";
const LOW: &str = "Low";
const NORMAL: &str = "Normal";
const MK1: &str = "Mk1";
const BASELINE: &str = "Baseline";

/// How a test plan family sets priority, precondition, folder and estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Policy {
    /// Mk1 rows are `High` with precondition `Mk1`, the rest `Low` with
    /// precondition `Baseline`. Only small-signal-gain sheets get a folder.
    #[default]
    Precondition,
    /// Priority is `Mk1`, `Baseline` or `Low` from the two flag columns.
    Baseline,
    /// Every row is `Normal`.
    Uniform,
}

/// How the folder is derived from the test type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FolderRule {
    /// Only `SSG_*` test types get a folder
    SmallSignalGainOnly,
    /// `<first>: <second>` for every test type
    Generic,
}

/// Flag values of one row, already compared against `Y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub(crate) mk1: bool,
    pub(crate) baseline: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Classification {
    pub(crate) priority: &'static str,
    pub(crate) precondition: Option<&'static str>,
}

impl Policy {
    /// Roles that must resolve to a column for this policy, in addition to
    /// the number, chip, voltage and temperature every sheet needs.
    pub(crate) fn required_roles(self) -> &'static [ColumnRole] {
        match self {
            Policy::Precondition => &[ColumnRole::Label, ColumnRole::Mk1],
            Policy::Baseline => &[ColumnRole::Baseline, ColumnRole::Mk1],
            Policy::Uniform => &[],
        }
    }

    pub(crate) fn folder_rule(self) -> FolderRule {
        match self {
            Policy::Precondition => FolderRule::SmallSignalGainOnly,
            Policy::Baseline | Policy::Uniform => FolderRule::Generic,
        }
    }

    pub(crate) fn estimate(self) -> &'static str {
        match self {
            Policy::Precondition => "08:00",
            Policy::Baseline | Policy::Uniform => "1:00",
        }
    }

    /// Whether records carry the label and precondition fields.
    pub(crate) fn has_precondition(self) -> bool {
        self == Policy::Precondition
    }

    pub(crate) fn classify(self, flags: Flags) -> Classification {
        match self {
            Policy::Precondition if flags.mk1 => Classification {
                priority: HIGH,
                precondition: Some(MK1),
            },
            Policy::Precondition => Classification {
                priority: LOW,
                precondition: Some(BASELINE),
            },
            Policy::Baseline => Classification {
                priority: if flags.mk1 {
                    MK1
                } else if flags.baseline {
                    BASELINE
                } else {
                    LOW
                },
                precondition: None,
            },
            Policy::Uniform => Classification {
                priority: NORMAL,
                precondition: None,
            },
        }
    }
}
