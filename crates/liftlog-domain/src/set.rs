//! Workout set records and the request/response envelopes around them
//!
//! None of these types outlive a single request.

use serde::{Deserialize, Serialize};

/// Inbound payload for `POST /parse`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Free-form workout notes; may be empty or whitespace-only
    pub text: String,
}

impl ParseRequest {
    /// Create a request from any string-like value
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One set extracted from the notes.
///
/// `reps_total` is expected to equal `reps_unassisted + reps_assisted`, but
/// that relationship is owned by the model and is not enforced here
/// (see [`ParsedSet::reps_consistent`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSet {
    /// Calendar date (`YYYY-MM-DD`) when the notes carried one
    pub date: Option<String>,

    /// Normalized exercise name, including equipment (e.g. "DB Bench Press")
    pub exercise_name: String,

    /// Load; per hand for dumbbell work unless the notes say otherwise
    pub weight: f64,

    /// Reps completed without help
    pub reps_unassisted: i64,

    /// Reps completed with help
    pub reps_assisted: i64,

    /// Total reps
    pub reps_total: i64,

    /// Tempo notation, verbatim (e.g. "3-1-1")
    pub tempo_notes: Option<String>,

    /// Whether the notes mention pain, strain, a tweak, etc.
    #[serde(default)]
    pub injury_flag: bool,

    /// Description of the injury when `injury_flag` is set
    pub injury_notes: Option<String>,

    /// Equipment code (DB, BB, BW, Machine, Cable, ...)
    pub equipment: Option<String>,

    /// The raw fragment this set was parsed from
    pub source_line: Option<String>,

    /// Anything left over
    pub notes: Option<String>,
}

impl ParsedSet {
    /// Create a set with the required fields and empty optional text fields
    pub fn new(
        exercise_name: impl Into<String>,
        weight: f64,
        reps_unassisted: i64,
        reps_assisted: i64,
        reps_total: i64,
    ) -> Self {
        Self {
            date: None,
            exercise_name: exercise_name.into(),
            weight,
            reps_unassisted,
            reps_assisted,
            reps_total,
            tempo_notes: Some(String::new()),
            injury_flag: false,
            injury_notes: Some(String::new()),
            equipment: Some(String::new()),
            source_line: Some(String::new()),
            notes: Some(String::new()),
        }
    }

    /// True when `reps_total == reps_unassisted + reps_assisted`
    pub fn reps_consistent(&self) -> bool {
        self.reps_unassisted
            .checked_add(self.reps_assisted)
            .is_some_and(|sum| sum == self.reps_total)
    }
}

/// Outbound payload for `POST /parse`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Validated sets in the order the model emitted them
    pub sets: Vec<ParsedSet>,
}

impl ParseResponse {
    /// An empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an ordered list of sets
    pub fn from_sets(sets: Vec<ParsedSet>) -> Self {
        Self { sets }
    }

    /// Number of sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when no sets were extracted
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
