use std::sync::Arc;

use crate::collision::{collide_node, ContactResponse, EmptyField, TileField};
use crate::constraint::area::AreaConstraint;
use crate::constraint::attachment::{AnchorTarget, AttachmentConstraint};
use crate::constraint::distance::DistanceConstraint;
use crate::constraint::{Constraint, ConstraintKind};
use crate::material::Material;
use crate::node::Node;
use crate::V2;
use protocol::pr_model::{PrConstraint, PrModel};

/// One soft body: a node arena plus the constraints between its nodes.
///
/// Nodes and constraints are append-only; a node id is its index and stays
/// valid for the lifetime of the simulation.
#[derive(Clone)]
pub struct Simulation {
	pub gravity: V2,
	pub dt: f32,
	pub pressure: f32,
	pub viscosity: f32,
	material: Material,
	field: Arc<dyn TileField>,

	nodes: Vec<Node>,
	distances: Vec<DistanceConstraint>,
	areas: Vec<AreaConstraint>,
	attachments: Vec<AttachmentConstraint>,
	contacts: usize,
}

impl Default for Simulation {
	fn default() -> Self {
		Self {
			gravity: V2::new(0., 0.35),
			dt: 1.0,
			pressure: 0.0,
			viscosity: 0.1,
			material: Material::default(),
			field: Arc::new(EmptyField),

			nodes: Vec::new(),
			distances: Vec::new(),
			areas: Vec::new(),
			attachments: Vec::new(),
			contacts: 0,
		}
	}
}

impl Simulation {
	pub fn with_gravity(mut self, gravity: V2) -> Self {
		self.gravity = gravity;
		self
	}

	pub fn with_dt(mut self, dt: f32) -> Self {
		self.dt = dt;
		self
	}

	pub fn with_pressure(mut self, pressure: f32) -> Self {
		self.pressure = pressure;
		self
	}

	pub fn with_viscosity(mut self, viscosity: f32) -> Self {
		self.viscosity = viscosity;
		self
	}

	pub fn with_material(mut self, material: Material) -> Self {
		self.material = material;
		self
	}

	pub fn with_tile_field(mut self, field: Arc<dyn TileField>) -> Self {
		self.field = field;
		self
	}

	pub fn material(&self) -> &Material {
		&self.material
	}

	/// Links created afterwards read the new multipliers; existing links
	/// keep the stiffness they were created with.
	pub fn set_material(&mut self, material: Material) {
		self.material = material;
	}

	fn check_node(&self, index: usize) {
		assert!(
			index < self.nodes.len(),
			"node index {} out of bounds (count: {})",
			index,
			self.nodes.len()
		);
	}

	pub fn add_node(&mut self, pos: V2, mass: f32, radius: f32, pinned: bool) -> usize {
		self.nodes.push(Node::new(pos, mass, radius, pinned));
		self.nodes.len() - 1
	}

	pub fn pin_node(&mut self, index: usize, pos: V2) {
		self.check_node(index);
		self.nodes[index].pin(pos);
	}

	pub fn add_force(&mut self, index: usize, force: V2) {
		self.check_node(index);
		self.nodes[index].add_force(force);
	}

	pub fn add_link(
		&mut self,
		a: usize,
		b: usize,
		stiffness: f32,
		kind: ConstraintKind,
	) -> usize {
		self.check_node(a);
		self.check_node(b);
		let dc = DistanceConstraint::new(&self.nodes, a, b, stiffness, kind);
		self.distances.push(dc);
		self.distances.len() - 1
	}

	pub fn add_area(&mut self, a: usize, b: usize, c: usize, stiffness: f32) -> usize {
		for i in [a, b, c] {
			self.check_node(i);
		}
		let ac = AreaConstraint::new(&self.nodes, [a, b, c], stiffness);
		self.areas.push(ac);
		self.areas.len() - 1
	}

	pub fn add_attachment(
		&mut self,
		node: usize,
		target: Box<dyn AnchorTarget>,
		stiffness: f32,
	) -> usize {
		self.check_node(node);
		self.attachments
			.push(AttachmentConstraint::new(node, target, stiffness));
		self.attachments.len() - 1
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn node(&self, index: usize) -> &Node {
		&self.nodes[index]
	}

	pub fn positions(&self) -> impl Iterator<Item = V2> + '_ {
		self.nodes.iter().map(|n| n.pos)
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn distances(&self) -> &[DistanceConstraint] {
		&self.distances
	}

	pub fn areas(&self) -> &[AreaConstraint] {
		&self.areas
	}

	pub fn attachments(&self) -> &[AttachmentConstraint] {
		&self.attachments
	}

	/// Contacts resolved during the last step, summed over iterations.
	pub fn contact_count(&self) -> usize {
		self.contacts
	}

	fn integrate(&mut self) {
		let g = self.gravity * self.material.gravity_scale;
		for n in self.nodes.iter_mut() {
			n.integrate(g, self.material.damping, self.dt);
		}
	}

	fn solve_viscosity(&mut self) {
		if self.viscosity <= 0.0 {
			return;
		}
		for dc in self.distances.iter() {
			dc.damp_velocity(&mut self.nodes, self.viscosity);
		}
	}

	fn solve_pressure(&mut self) {
		if self.pressure <= 0.0 {
			return;
		}
		for ac in self.areas.iter() {
			ac.inflate(&mut self.nodes, self.pressure);
		}
	}

	fn collide_all(&mut self) -> usize {
		let up = if self.gravity.magnitude_squared() > 0.0 {
			-self.gravity.normalize()
		} else {
			V2::new(0., -1.)
		};
		let response = ContactResponse {
			friction: self.material.friction,
			bounce: self.material.bounce,
			up,
		};
		let field = self.field.as_ref();
		self.nodes
			.iter_mut()
			.map(|n| collide_node(n, field, &response))
			.sum()
	}

	fn solve_constraints(&mut self) {
		let material = &self.material;
		let nodes = &mut self.nodes;
		for dc in self.distances.iter() {
			dc.step(nodes, material);
		}
		if material.area_stiffness > 0.0 {
			for ac in self.areas.iter() {
				ac.step(nodes, material);
			}
		}
	}

	/// Advance one tick: integrate, damp, then relax constraints and
	/// resolve collisions `material.iterations` times.
	pub fn step(&mut self) {
		log::trace!(
			"step: {} nodes, {} links, {} areas, {} attachments",
			self.nodes.len(),
			self.distances.len(),
			self.areas.len(),
			self.attachments.len()
		);
		self.integrate();
		self.solve_viscosity();
		self.contacts = 0;
		for _ in 0..self.material.iterations.max(1) {
			self.solve_constraints();
			self.solve_pressure();
			for at in self.attachments.iter() {
				at.step(&mut self.nodes, &self.material);
			}
			self.contacts += self.collide_all();
		}
	}

	pub fn pr_constraints(&self) -> Vec<PrConstraint> {
		self.distances
			.iter()
			.map(|c| c as &dyn Constraint)
			.chain(self.areas.iter().map(|c| c as &dyn Constraint))
			.enumerate()
			.map(|(id, c)| c.render(id))
			.collect()
	}

	/// Render snapshot without mesh triangles; see the instance wrapper
	/// for the lattice mesh.
	pub fn pr_model(&self) -> PrModel {
		PrModel {
			particles: self.nodes.iter().map(|n| n.render()).collect(),
			constraints: self.pr_constraints(),
			triangles: Vec::new(),
		}
	}
}
