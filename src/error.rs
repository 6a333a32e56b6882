use thiserror::Error;

/// Failures at the operator-facing boundary. Simulation steps themselves never fail on bad
/// coordinates; those are treated as unwalkable or as no-ops.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' cannot be set to {value}")]
    InvalidParameter { name: String, value: f64 },
    #[error("unknown faction '{0}'")]
    UnknownFaction(String),
}
