//! Schema and invariant validation for generated plans.

use std::sync::LazyLock;

use jsonschema::Draft;
use serde_json::Value;

use crate::core::error::PlanError;
use crate::core::extract::{extract_json_array, strip_control_chars};
use crate::core::types::Plan;

const PLAN_SCHEMA: &str = include_str!("../../schemas/plan.schema.json");

static PLAN_VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(PLAN_SCHEMA).expect("embedded plan schema should be valid JSON");
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .expect("embedded plan schema should compile")
});

/// Parse raw model text into a validated [`Plan`].
///
/// Pipeline: trim, extract the bracketed array, strip control characters,
/// parse as JSON, validate against the schema, then check semantic
/// invariants. Any violation rejects the whole plan.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
    let trimmed = raw.trim();
    let candidate = extract_json_array(trimmed).ok_or_else(|| {
        PlanError::Parse(format!("no JSON array in model output: {}", excerpt(trimmed)))
    })?;
    let sanitized = strip_control_chars(candidate);

    let value: Value = serde_json::from_str(&sanitized)
        .map_err(|err| PlanError::Parse(format!("{err}; in: {}", excerpt(&sanitized))))?;
    validate_schema(&value)?;

    let plan: Plan =
        serde_json::from_value(value).map_err(|err| PlanError::Schema(err.to_string()))?;
    let errors = validate_invariants(&plan);
    if !errors.is_empty() {
        return Err(PlanError::Schema(errors.join("; ")));
    }
    Ok(plan)
}

/// Validate parsed JSON against the plan schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> Result<(), PlanError> {
    let messages: Vec<String> = PLAN_VALIDATOR
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(PlanError::Schema(messages.join("; ")))
    }
}

/// Bounded slice of the offending text for error messages.
fn excerpt(text: &str) -> String {
    const LIMIT: usize = 160;
    if text.len() <= LIMIT {
        return text.to_string();
    }
    let mut end = LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Check semantic invariants not expressible in JSON Schema:
/// - `description` must not be blank after trimming
/// - `payload` must not be blank after trimming
pub fn validate_invariants(plan: &Plan) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, step) in plan.steps.iter().enumerate() {
        if step.description.trim().is_empty() {
            errors.push(format!("step {index}: description must not be blank"));
        }
        if step.payload.trim().is_empty() {
            errors.push(format!("step {index}: payload must not be blank"));
        }
    }
    errors
}
