//! Typed failures for the plan generation path.

use thiserror::Error;

/// Why a planning round failed to produce a usable plan.
///
/// The generator retries exactly once with a stricter prompt on any of
/// these; a second failure propagates to the loop, which terminates with a
/// visible diagnostic.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The model endpoint could not be reached or refused the request.
    #[error("model request failed: {0}")]
    Transport(String),

    /// The reply did not contain a parseable JSON array.
    #[error("model output is not valid JSON: {0}")]
    Parse(String),

    /// The JSON parsed but violated the plan schema.
    #[error("plan failed validation: {0}")]
    Schema(String),
}
