pub mod pr_model;
use pr_model::PrModel;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
	#[error("message encoding failed: {0}")]
	Encode(bincode::Error),
	#[error("message decoding failed: {0}")]
	Decode(bincode::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Message {
	WorldUpdate(Vec<PrModel>),
	Nop,
}

impl Message {
	pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
		bincode::serialize(&self).map_err(ProtocolError::Encode)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
		bincode::deserialize(bytes).map_err(ProtocolError::Decode)
	}
}
