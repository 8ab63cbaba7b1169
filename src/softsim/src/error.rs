use thiserror::Error;

/// Recoverable configuration errors. Stepping never fails.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
	#[error("unknown material preset `{0}`")]
	UnknownPreset(String),
	#[error("material field `{field}` is invalid: {value}")]
	InvalidMaterial { field: &'static str, value: f32 },
	#[error("lattice spacing must be positive and finite, got {0}")]
	InvalidSpacing(f32),
}
