use crate::error::{Result, SheetOrmError};
use crate::record::Record;
use serde_json::Value;

/// How strictly a required field is checked on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Present and truthy: not null, `""`, `false`, or zero.
    NonEmpty,
    /// Present with any value, including `0`, `false`, or `""`.
    Present,
}

/// Fields every inserted record must carry.
pub const REQUIRED_FIELDS: &[(&str, Requirement)] = &[
    ("id", Requirement::NonEmpty),
    ("name", Requirement::NonEmpty),
    ("age", Requirement::Present),
];

/// Check an insert payload against [`REQUIRED_FIELDS`].
/// The error names every missing field, not just the first.
pub fn validate_insert(data: &Record) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|(field, requirement)| !satisfies(data.get(field), *requirement))
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(SheetOrmError::Validation(format!(
        "Invalid data format: 'id', 'name', and 'age' are required (missing: {})",
        missing.join(", ")
    )))
}

fn satisfies(value: Option<&Value>, requirement: Requirement) -> bool {
    match (value, requirement) {
        (None, _) => false,
        (Some(_), Requirement::Present) => true,
        (Some(Value::Null), Requirement::NonEmpty) => false,
        (Some(Value::String(s)), Requirement::NonEmpty) => !s.is_empty(),
        (Some(Value::Bool(b)), Requirement::NonEmpty) => *b,
        (Some(Value::Number(n)), Requirement::NonEmpty) => n.as_f64() != Some(0.0),
        (Some(_), Requirement::NonEmpty) => true,
    }
}
