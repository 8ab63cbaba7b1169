use crate::constraint::Constraint;
use crate::material::Material;
use crate::node::Node;
use crate::V2;

const MIN_DEVIATION: f32 = 1e-4;
const MIN_GRADIENT: f32 = 1e-6;

/// Signed area, positive for counter-clockwise triangles in a y-up frame.
pub fn area_p(p0: V2, p1: V2, p2: V2) -> f32 {
	0.5 * ((p1[0] - p0[0]) * (p2[1] - p0[1])
		- (p1[1] - p0[1]) * (p2[0] - p0[0]))
}

#[derive(Clone, Debug, PartialEq)]
pub struct AreaConstraint {
	pub ps: [usize; 3],
	pub s0: f32,
	pub stiffness: f32,
}

impl AreaConstraint {
	pub fn new(nodes: &[Node], ps: [usize; 3], stiffness: f32) -> Self {
		let s0 = area_p(nodes[ps[0]].pos, nodes[ps[1]].pos, nodes[ps[2]].pos);
		Self {
			ps,
			s0,
			stiffness: stiffness.clamp(0.0, 1.0),
		}
	}

	/// Push each vertex away from the triangle centroid.
	pub fn inflate(&self, nodes: &mut [Node], pressure: f32) {
		let w = self.ps.map(|i| nodes[i].get_imass());
		if w.iter().sum::<f32>() <= 0.0 {
			return;
		}
		let pos = self.ps.map(|i| nodes[i].get_pos());
		let centroid = (pos[0] + pos[1] + pos[2]) / 3.0;
		for k in 0..3 {
			nodes[self.ps[k]].add_pos((pos[k] - centroid) * pressure * w[k]);
		}
	}
}

impl Constraint for AreaConstraint {
	fn step(&self, nodes: &mut [Node], material: &Material) {
		// the material multiplier is the live gain; a triangle baked with
		// zero stiffness stays inert
		let s = material.area_stiffness.clamp(0.0, 1.0);
		if s <= 0.0 || self.stiffness <= 0.0 {
			return;
		}
		let w = self.ps.map(|i| nodes[i].get_imass());
		if w.iter().sum::<f32>() <= 0.0 {
			return;
		}
		let [p0, p1, p2] = self.ps.map(|i| nodes[i].get_pos());
		let c = area_p(p0, p1, p2) - self.s0;
		if c.abs() < MIN_DEVIATION {
			return;
		}

		let grad = [
			0.5 * V2::new(p1[1] - p2[1], p2[0] - p1[0]),
			0.5 * V2::new(p2[1] - p0[1], p0[0] - p2[0]),
			0.5 * V2::new(p0[1] - p1[1], p1[0] - p0[0]),
		];
		let beta: f32 = (0..3).map(|k| w[k] * grad[k].magnitude_squared()).sum();
		if beta < MIN_GRADIENT {
			return;
		}
		let lambda = c / beta * s;
		for k in 0..3 {
			nodes[self.ps[k]].add_pos(-lambda * w[k] * grad[k]);
		}
	}

	fn node_ids(&self) -> Vec<usize> {
		self.ps.to_vec()
	}
}
