// pr_model: Physical model for rendering

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrParticle {
	pub pos: [f32; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrConstraint {
	pub id: usize,
	pub particles: Vec<usize>,
}

/// Snapshot of one soft body. `particles` is indexed by node id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrModel {
	pub particles: Vec<PrParticle>,
	pub constraints: Vec<PrConstraint>,
	// ccw-agnostic index triples into `particles`
	pub triangles: Vec<[usize; 3]>,
}

impl PrModel {
	pub fn positions(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
		self.particles.iter().map(|p| p.pos)
	}

	/// Flattened triangle list, the layout an indexed draw call expects.
	pub fn indices(&self) -> Vec<u32> {
		self.triangles
			.iter()
			.flat_map(|t| t.iter().map(|&i| i as u32))
			.collect()
	}
}
