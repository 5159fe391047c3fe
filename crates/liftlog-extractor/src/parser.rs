//! Normalize raw model output into validated sets
//!
//! Decoding is an ordered ladder: strict JSON, then fence-stripped JSON, then
//! give up to empty. Each rung is a separate function so the degradation
//! policy can be exercised on its own. Nothing in here returns an error to the
//! caller; bad output degrades to an empty or partial list.

use liftlog_domain::ParsedSet;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Triple-backtick fence marker
const FENCE: &str = "```";

/// Which rung of the ladder produced a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rung {
    /// The raw text was valid JSON as-is
    Strict,
    /// Valid JSON was found between fence markers
    FenceStripped,
}

/// Why decoding gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing but whitespace
    Blank,
    /// Not JSON, and not fenced
    NotJson,
    /// Fenced, but the fenced content was not JSON either
    FencedNotJson,
}

/// Tagged result of the decode ladder
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A JSON value and the rung that produced it
    Json {
        /// The decoded value
        value: Value,
        /// Rung that succeeded
        rung: Rung,
    },
    /// No JSON could be recovered
    Empty {
        /// Why
        reason: EmptyReason,
    },
}

impl Decoded {
    /// The successful rung, if any
    pub fn rung(&self) -> Option<Rung> {
        match self {
            Decoded::Json { rung, .. } => Some(*rung),
            Decoded::Empty { .. } => None,
        }
    }
}

/// Outcome of normalizing one model response
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Validated sets, in model order
    pub sets: Vec<ParsedSet>,
    /// Rung that produced the JSON, `None` if decoding gave up
    pub rung: Option<Rung>,
    /// Set when decoding gave up
    pub empty_reason: Option<EmptyReason>,
    /// Elements in the candidate list
    pub candidates: usize,
    /// Elements discarded by validation
    pub dropped: usize,
}

/// Run the full normalization pipeline over raw model output
pub fn normalize(raw: &str, enforce_rep_totals: bool) -> Normalized {
    let decoded = decode(raw);
    let rung = decoded.rung();

    let (value, empty_reason) = match decoded {
        Decoded::Json { value, .. } => (value, None),
        Decoded::Empty { reason } => {
            if reason != EmptyReason::Blank {
                warn!("Model output is not JSON ({:?}); returning no sets", reason);
            }
            (Value::Null, Some(reason))
        }
    };

    let candidates = candidate_list(&value);
    let sets: Vec<ParsedSet> = candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match parse_set(item) {
            Ok(set) => accept_set(idx, set, enforce_rep_totals),
            Err(e) => {
                warn!("Dropping set {}: {}", idx, e);
                None
            }
        })
        .collect();

    debug!(
        "Normalized {} of {} candidates via {:?}",
        sets.len(),
        candidates.len(),
        rung
    );

    Normalized {
        dropped: candidates.len() - sets.len(),
        candidates: candidates.len(),
        sets,
        rung,
        empty_reason,
    }
}

fn accept_set(idx: usize, set: ParsedSet, enforce_rep_totals: bool) -> Option<ParsedSet> {
    if set.reps_consistent() {
        return Some(set);
    }
    if enforce_rep_totals {
        warn!(
            "Dropping set {}: reps_total {} != {} + {}",
            idx, set.reps_total, set.reps_unassisted, set.reps_assisted
        );
        return None;
    }
    debug!("Set {} has inconsistent rep totals; keeping model values", idx);
    Some(set)
}

/// Decode the raw text, walking the ladder until a rung succeeds
pub fn decode(raw: &str) -> Decoded {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Decoded::Json {
            value,
            rung: Rung::Strict,
        };
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decoded::Empty {
            reason: EmptyReason::Blank,
        };
    }

    match strip_fence(trimmed) {
        Some(inner) => match serde_json::from_str::<Value>(inner) {
            Ok(value) => Decoded::Json {
                value,
                rung: Rung::FenceStripped,
            },
            Err(_) => Decoded::Empty {
                reason: EmptyReason::FencedNotJson,
            },
        },
        None => Decoded::Empty {
            reason: EmptyReason::NotJson,
        },
    }
}

/// Return the content between the first pair of fence markers.
///
/// Only applies when the trimmed text starts with a fence. An unclosed fence
/// yields the remainder. A leading info string (`json`, `JSON`) is dropped.
pub fn strip_fence(raw: &str) -> Option<&str> {
    let rest = raw.trim().strip_prefix(FENCE)?;
    let inner = match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    };

    let inner = inner.trim();
    let body = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if body.len() != inner.len() && body.trim_start().starts_with(['{', '[']) {
        Some(body.trim())
    } else {
        Some(inner)
    }
}

/// Pick the list of set candidates out of a decoded value.
///
/// `{"sets": [...]}` yields the array; a bare array is used directly.
/// Anything else, including a non-array `sets`, yields nothing.
pub fn candidate_list(value: &Value) -> &[Value] {
    match value {
        Value::Object(map) => map
            .get("sets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        Value::Array(items) => items,
        _ => &[],
    }
}

/// Validate a single candidate against the set schema
pub fn parse_set(json: &Value) -> Result<ParsedSet, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Set is not a JSON object".to_string())?;

    Ok(ParsedSet {
        date: optional_text(obj, "date", None)?,
        exercise_name: required_text(obj, "exercise_name")?,
        weight: required_number(obj, "weight")?,
        reps_unassisted: required_integer(obj, "reps_unassisted")?,
        reps_assisted: required_integer(obj, "reps_assisted")?,
        reps_total: required_integer(obj, "reps_total")?,
        tempo_notes: optional_text(obj, "tempo_notes", Some(String::new()))?,
        injury_flag: flag(obj, "injury_flag")?,
        injury_notes: optional_text(obj, "injury_notes", Some(String::new()))?,
        equipment: optional_text(obj, "equipment", Some(String::new()))?,
        source_line: optional_text(obj, "source_line", Some(String::new()))?,
        notes: optional_text(obj, "notes", Some(String::new()))?,
    })
}

fn required_text(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", key))
}

fn required_number(obj: &Map<String, Value>, key: &str) -> Result<f64, String> {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.ok_or_else(|| format!("Missing or invalid '{}'", key))
}

fn required_integer(obj: &Map<String, Value>, key: &str) -> Result<i64, String> {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Bool(b)) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| format!("Missing or invalid '{}'", key))
}

/// Missing → `missing`, null → None, string → Some, other → error
fn optional_text(
    obj: &Map<String, Value>,
    key: &str,
    missing: Option<String>,
) -> Result<Option<String>, String> {
    match obj.get(key) {
        None => Ok(missing),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("Invalid '{}'", key)),
    }
}

fn flag(obj: &Map<String, Value>, key: &str) -> Result<bool, String> {
    match obj.get(key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(format!("Invalid '{}'", key)),
    }
}
