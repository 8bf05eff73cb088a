// ********* Input data structures ***********

use rust_decimal::Decimal;
use snafu::Snafu;
use std::collections::{BTreeMap, HashMap};

/// Bit position of the first year of middle school in a [GradeMask].
pub const FIRST_MIDDLE_SCHOOL_BIT: i32 = 16;

/// A set of possible academic grades, packed in a 32-bit word.
///
/// Bit `b` stands for the grade level `b - 16`, where level 0 is the first year
/// of middle school. Several bits set means the label is genuinely ambiguous.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct GradeMask(pub u32);

impl GradeMask {
    /// The mask of the "primary school or nothing" label: primary school years
    /// (levels -6 to -1) and everything after high school (levels 6 to 15).
    pub const PRIMARY_OR_NONE: GradeMask = GradeMask(0xFFC0_FC00);

    /// The single-bit mask for the given bit position, if it fits in 32 bits.
    pub fn from_bit(bit: i32) -> Option<GradeMask> {
        if (0..32).contains(&bit) {
            Some(GradeMask(1 << bit))
        } else {
            None
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All the grade levels contained in this mask, lowest first.
    pub fn levels(self) -> GradeLevels {
        GradeLevels { rest: self.0 }
    }
}

/// Iterator over the grade levels of a mask. Peels one low bit at a time.
#[derive(Debug, Clone)]
pub struct GradeLevels {
    rest: u32,
}

impl Iterator for GradeLevels {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.rest == 0 {
            return None;
        }
        let bit = self.rest.trailing_zeros() as i32;
        self.rest &= self.rest - 1;
        Some(bit - FIRST_MIDDLE_SCHOOL_BIT)
    }
}

/// The grammar used to read regular grade labels.
///
/// A label is read by stripping tokens from its front, in the order given in
/// `elements` (first match wins). Each token adds its delta to a running bit
/// position that starts at `initial`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GradeTokens {
    pub initial: i32,
    pub elements: Vec<(String, i32)>,
}

/// Contest type label -> multiplicative coefficient.
pub type TypeCoefficients = HashMap<String, Decimal>;

/// Surname (1 or 2 characters) -> correct initials, one character per name unit.
pub type SurnameTable = HashMap<String, String>;

/// A contest, as far as scoring is concerned.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contest {
    pub id: String,
    pub kind: String,
    pub year: i32,
    school_year: i32,
}

impl Contest {
    /// A contest whose school year is its calendar year.
    pub fn new(id: &str, kind: &str, year: i32) -> Contest {
        Contest {
            id: id.to_string(),
            kind: kind.to_string(),
            year,
            school_year: year,
        }
    }

    pub fn with_school_year(self, school_year: i32) -> Contest {
        Contest {
            school_year,
            ..self
        }
    }

    /// The school year the grade labels of this contest refer to.
    pub fn school_year(&self) -> i32 {
        self.school_year
    }
}

/// One line of an award list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AwardRecord {
    pub contest: String,
    pub name: String,
    pub grade: String,
    pub rank: i64,
    pub total: i64,
}

// ******** Output data structures *********

/// Candidate middle-school enrollment years with their priority.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EnrollmentCandidates(BTreeMap<i32, u32>);

impl EnrollmentCandidates {
    pub fn new() -> EnrollmentCandidates {
        EnrollmentCandidates(BTreeMap::new())
    }

    pub fn insert(&mut self, year: i32, weight: u32) {
        self.0.insert(year, weight);
    }

    pub fn weight(&self, year: i32) -> Option<u32> {
        self.0.get(&year).cloned()
    }

    pub fn years(&self) -> Vec<i32> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.0.iter().map(|(y, w)| (*y, *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(i32, u32)> for EnrollmentCandidates {
    fn from_iter<I: IntoIterator<Item = (i32, u32)>>(iter: I) -> Self {
        EnrollmentCandidates(iter.into_iter().collect())
    }
}

/// Everything the scorer derives from a single award record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecordEvaluation {
    pub grades: GradeMask,
    pub enrollment: EnrollmentCandidates,
    pub rank_coefficient: Decimal,
    pub type_coefficient: Decimal,
    pub decay_coefficient: Decimal,
}

// ******** Errors *********

/// A grade label that could not be read. Fatal for the record carrying it.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GradeError {
    #[snafu(display("Unknown grade label {label:?} (unreadable from {rest:?})"))]
    UnknownGrade { label: String, rest: String },
    #[snafu(display("Grade label {label:?} resolves to bit {bit}, outside of 0..=31"))]
    GradeOutOfRange { label: String, bit: i32 },
}

/// A rank coefficient table that does not have the required shape.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    #[snafu(display("Rank table has {len} entries, expected {expected}"))]
    WrongLength { len: usize, expected: usize },
    #[snafu(display("Rank table increases at index {index}: {before} < {after}"))]
    NotMonotonic {
        index: usize,
        before: Decimal,
        after: Decimal,
    },
}

/// Errors that prevent a scorer from being assembled.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BuildError {
    #[snafu(display("No grade tokens were provided"))]
    MissingGradeTokens {},
    #[snafu(display("No contest type coefficients were provided"))]
    MissingTypeCoefficients {},
    #[snafu(display("Invalid rank table"))]
    InvalidTable { source: TableError },
}
