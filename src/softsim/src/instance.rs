use std::sync::{Arc, RwLock, Weak};

use nalgebra::Rotation2;

use crate::constraint::attachment::AnchorTarget;
use crate::lattice::LatticeGrid;
use crate::material::Material;
use crate::simulation::Simulation;
use crate::V2;
use protocol::pr_model::PrModel;

/// The game object a soft body hangs on. Owned by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
	pub center: V2,
	pub rotation: f32,
	pub active: bool,
}

pub type ERef = Arc<RwLock<Entity>>;

impl Entity {
	pub fn new_ref(center: V2) -> ERef {
		Arc::new(RwLock::new(Self {
			center,
			rotation: 0.0,
			active: true,
		}))
	}
}

/// Tracks a point fixed in an entity's frame without keeping it alive.
#[derive(Clone)]
pub struct EntityAnchor {
	entity: Weak<RwLock<Entity>>,
	offset: V2,
	local: V2,
	follow_rotation: bool,
}

impl EntityAnchor {
	pub fn new(entity: &ERef, offset: V2, local: V2, follow_rotation: bool) -> Self {
		Self {
			entity: Arc::downgrade(entity),
			offset,
			local,
			follow_rotation,
		}
	}
}

impl AnchorTarget for EntityAnchor {
	fn evaluate(&self) -> Option<V2> {
		let entity = self.entity.upgrade()?;
		let e = entity.read().ok()?;
		let local = if self.follow_rotation {
			Rotation2::new(e.rotation) * self.local
		} else {
			self.local
		};
		Some(e.center + self.offset + local)
	}
}

pub struct SoftbodyInstance {
	sim: Simulation,
	grid: LatticeGrid,
	entity: Option<Weak<RwLock<Entity>>>,
}

impl SoftbodyInstance {
	/// `material` replaces whatever the simulation was built with; links
	/// already created keep their baked stiffness.
	pub fn new(mut sim: Simulation, grid: LatticeGrid, material: Material) -> Self {
		sim.set_material(material);
		Self {
			sim,
			grid,
			entity: None,
		}
	}

	pub fn sim(&self) -> &Simulation {
		&self.sim
	}

	pub fn sim_mut(&mut self) -> &mut Simulation {
		&mut self.sim
	}

	pub fn grid(&self) -> &LatticeGrid {
		&self.grid
	}

	/// Attach `nodes` to `entity.center + offset`, each keeping its current
	/// offset from the entity center. Returns the number attached.
	pub fn attach_nodes(
		&mut self,
		entity: &ERef,
		offset: V2,
		nodes: &[usize],
		stiffness: f32,
	) -> usize {
		let Ok(center) = entity.read().map(|e| e.center) else {
			return 0;
		};
		self.entity = Some(Arc::downgrade(entity));
		for &id in nodes {
			let local = self.sim.node(id).pos - center - offset;
			let anchor = EntityAnchor::new(entity, offset, local, false);
			self.sim.add_attachment(id, Box::new(anchor), stiffness);
		}
		nodes.len()
	}

	/// Attach the grid's center node and its four axis neighbours, rotating
	/// with the entity. Absent cells are skipped.
	pub fn attach_center_cross(&mut self, entity: &ERef) -> usize {
		let Ok(center) = entity.read().map(|e| e.center) else {
			return 0;
		};
		self.entity = Some(Arc::downgrade(entity));
		let (cx, cy) = (self.grid.width() / 2, self.grid.height() / 2);
		let cells = [
			Some((cx, cy)),
			Some((cx + 1, cy)),
			cx.checked_sub(1).map(|x| (x, cy)),
			Some((cx, cy + 1)),
			cy.checked_sub(1).map(|y| (cx, y)),
		];
		let stiffness = self.sim.material().attachment_stiffness;
		let mut attached = 0;
		for (x, y) in cells.into_iter().flatten() {
			let Some(id) = self.grid.get(x, y) else {
				continue;
			};
			let local = self.sim.node(id).pos - center;
			let anchor = EntityAnchor::new(entity, V2::zeros(), local, true);
			self.sim.add_attachment(id, Box::new(anchor), stiffness);
			attached += 1;
		}
		attached
	}

	/// Unattached bodies live forever; attached ones die with their entity.
	pub fn is_alive(&self) -> bool {
		let Some(entity) = &self.entity else {
			return true;
		};
		let Some(entity) = entity.upgrade() else {
			return false;
		};
		let Ok(e) = entity.read() else {
			return false;
		};
		e.active
	}

	pub fn update(&mut self) -> bool {
		if !self.is_alive() {
			return false;
		}
		self.sim.step();
		true
	}

	pub fn pr_model(&self) -> PrModel {
		let mut model = self.sim.pr_model();
		model.triangles = self.grid.triangles();
		model
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::lattice::build_rectangular;

	fn body(material: Material) -> SoftbodyInstance {
		let mut sim = Simulation::default()
			.with_gravity(V2::zeros())
			.with_material(Material::jelly());
		let grid =
			build_rectangular(&mut sim, V2::new(-20., -20.), 5, 5, 10.0, 1.0, 2.0)
				.unwrap();
		SoftbodyInstance::new(sim, grid, material)
	}

	#[test]
	fn test_instance_material_wins() {
		let inst = body(Material::flesh());
		assert_eq!(inst.sim().material(), &Material::flesh());
		// links were baked from jelly
		assert!((inst.sim().distances()[0].stiffness - 0.04).abs() < 1e-6);
	}

	#[test]
	fn test_center_cross_follows_entity() {
		let mut inst = body(Material::default());
		let npc = Entity::new_ref(V2::zeros());
		assert_eq!(inst.attach_center_cross(&npc), 5);
		let center = inst.grid().get(2, 2).unwrap();
		assert_eq!(inst.sim().node(center).pos, V2::zeros());

		npc.write().unwrap().center = V2::new(30., 0.);
		for _ in 0..100 {
			assert!(inst.update());
		}
		let p = inst.sim().node(center).pos;
		assert!((p - V2::new(30., 0.)).magnitude() < 0.5, "{:?}", p);
	}

	#[test]
	fn test_anchor_rotation() {
		let npc = Entity::new_ref(V2::new(1., 1.));
		let anchor = EntityAnchor::new(&npc, V2::zeros(), V2::new(10., 0.), true);
		npc.write().unwrap().rotation = std::f32::consts::FRAC_PI_2;
		let p = anchor.evaluate().unwrap();
		assert!((p - V2::new(1., 11.)).magnitude() < 1e-4);
		let fixed = EntityAnchor::new(&npc, V2::new(0., 5.), V2::new(10., 0.), false);
		assert!((fixed.evaluate().unwrap() - V2::new(11., 6.)).magnitude() < 1e-4);
	}

	#[test]
	fn test_attach_nodes_keeps_offsets() {
		let mut inst = body(Material::default());
		let npc = Entity::new_ref(V2::new(5., 5.));
		let top: Vec<usize> = (0..5).filter_map(|x| inst.grid().get(x, 0)).collect();
		assert_eq!(inst.attach_nodes(&npc, V2::new(0., -3.), &top, 0.5), 5);
		for (at, &id) in inst.sim().attachments().iter().zip(top.iter()) {
			assert_eq!(at.target.evaluate(), Some(inst.sim().node(id).pos));
		}
	}

	#[test]
	fn test_dies_with_entity() {
		let mut inst = body(Material::default());
		assert!(inst.is_alive());
		let npc = Entity::new_ref(V2::zeros());
		inst.attach_center_cross(&npc);
		npc.write().unwrap().active = false;
		assert!(!inst.update());
		npc.write().unwrap().active = true;
		assert!(inst.update());
		drop(npc);
		assert!(!inst.is_alive());
		// anchors hold no strong reference
		assert_eq!(inst.sim().attachments()[0].target.evaluate(), None);
	}

	#[test]
	fn test_poisoned_entity_is_dead() {
		let mut inst = body(Material::default());
		let npc = Entity::new_ref(V2::zeros());
		inst.attach_center_cross(&npc);
		let held = npc.clone();
		let _ = std::thread::spawn(move || {
			let _guard = held.write().unwrap();
			panic!("entity update failed");
		})
		.join();
		assert!(npc.is_poisoned());
		assert!(!inst.is_alive());
		assert!(!inst.update());
		assert_eq!(inst.sim().attachments()[0].target.evaluate(), None);
	}

	#[test]
	fn test_pr_model_has_mesh() {
		let inst = body(Material::default());
		let model = inst.pr_model();
		assert_eq!(model.particles.len(), 25);
		assert_eq!(model.triangles.len(), 32);
	}
}
