use crate::constraint::{Constraint, ConstraintKind};
use crate::material::Material;
use crate::node::Node;

const MIN_LENGTH: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct DistanceConstraint {
	pub a: usize,
	pub b: usize,
	pub l0: f32,
	pub stiffness: f32,
	pub kind: ConstraintKind,
}

impl DistanceConstraint {
	/// Rest length is taken from the current node separation.
	pub fn new(
		nodes: &[Node],
		a: usize,
		b: usize,
		stiffness: f32,
		kind: ConstraintKind,
	) -> Self {
		let l0 = (nodes[a].pos - nodes[b].pos).magnitude();
		Self {
			a,
			b,
			l0,
			stiffness: stiffness.clamp(0.0, 1.0),
			kind,
		}
	}

	/// Pull the endpoint velocities toward each other through their
	/// previous positions. Positions are left alone.
	pub fn damp_velocity(&self, nodes: &mut [Node], viscosity: f32) {
		let (na, nb) = (&nodes[self.a], &nodes[self.b]);
		if na.is_pinned() && nb.is_pinned() {
			return;
		}
		let vdiff = nb.velocity() - na.velocity();
		let impulse = vdiff * viscosity * 0.5;
		if !nodes[self.a].is_pinned() {
			nodes[self.a].ppos -= impulse;
		}
		if !nodes[self.b].is_pinned() {
			nodes[self.b].ppos += impulse;
		}
	}
}

impl Constraint for DistanceConstraint {
	fn step(&self, nodes: &mut [Node], material: &Material) {
		let wa = nodes[self.a].get_imass();
		let wb = nodes[self.b].get_imass();
		let w = wa + wb;
		if w <= 0.0 {
			return;
		}
		if self.l0 < MIN_LENGTH {
			return;
		}
		let dp = nodes[self.b].get_pos() - nodes[self.a].get_pos();
		let l = dp.magnitude();
		if l < MIN_LENGTH {
			return;
		}
		let s = (self.stiffness * material.kind_multiplier(self.kind))
			.clamp(0.0, 1.0);
		let correct = dp * (s * (l - self.l0) / l);
		nodes[self.a].add_pos(correct * (wa / w));
		nodes[self.b].add_pos(-correct * (wb / w));
	}

	fn node_ids(&self) -> Vec<usize> {
		vec![self.a, self.b]
	}
}
