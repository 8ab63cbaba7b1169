pub mod area;
pub mod attachment;
pub mod distance;

use crate::material::Material;
use crate::node::Node;
use protocol::pr_model::PrConstraint;

/// Tag selecting which live material multiplier a distance link uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
	Structural,
	Shear,
	Bend,
	Custom,
}

/// One relaxation pass of a constraint over the node table.
pub trait Constraint {
	fn step(&self, nodes: &mut [Node], material: &Material);

	fn node_ids(&self) -> Vec<usize>;

	fn render(&self, id: usize) -> PrConstraint {
		PrConstraint {
			id,
			particles: self.node_ids(),
		}
	}
}
