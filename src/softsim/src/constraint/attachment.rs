use dyn_clone::DynClone;

use crate::constraint::Constraint;
use crate::material::Material;
use crate::node::Node;
use crate::V2;

const MIN_OFFSET: f32 = 1e-4;

/// Supplies the world-space point an attached node is pulled toward.
///
/// Evaluated once per relaxation iteration, so implementations must be
/// read-only. Returning `None` means the anchor no longer exists and the
/// attachment is skipped.
pub trait AnchorTarget: DynClone + Send + Sync {
	fn evaluate(&self) -> Option<V2>;
}

dyn_clone::clone_trait_object!(AnchorTarget);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTarget(pub V2);

impl AnchorTarget for FixedTarget {
	fn evaluate(&self) -> Option<V2> {
		Some(self.0)
	}
}

#[derive(Clone)]
pub struct AttachmentConstraint {
	pub p: usize,
	pub target: Box<dyn AnchorTarget>,
	pub stiffness: f32,
}

impl AttachmentConstraint {
	pub fn new(p: usize, target: Box<dyn AnchorTarget>, stiffness: f32) -> Self {
		Self {
			p,
			target,
			stiffness: stiffness.clamp(0.0, 1.0),
		}
	}
}

impl Constraint for AttachmentConstraint {
	fn step(&self, nodes: &mut [Node], _material: &Material) {
		let p = &mut nodes[self.p];
		if p.is_pinned() {
			return;
		}
		let Some(target) = self.target.evaluate() else {
			return;
		};
		let dp = p.get_pos() - target;
		if dp.magnitude() < MIN_OFFSET {
			return;
		}
		p.add_pos(-dp * self.stiffness);
	}

	fn node_ids(&self) -> Vec<usize> {
		vec![self.p]
	}
}
