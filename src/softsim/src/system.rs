use crate::instance::SoftbodyInstance;
use protocol::pr_model::PrModel;
use protocol::Message;

/// Owns every live soft body and steps each once per game tick.
#[derive(Default)]
pub struct SoftbodySystem {
	instances: Vec<SoftbodyInstance>,
}

impl SoftbodySystem {
	pub fn with_instance(mut self, instance: SoftbodyInstance) -> Self {
		self.add(instance);
		self
	}

	pub fn add(&mut self, instance: SoftbodyInstance) {
		self.instances.push(instance);
	}

	pub fn len(&self) -> usize {
		self.instances.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}

	pub fn instances(&self) -> &[SoftbodyInstance] {
		&self.instances
	}

	fn drop_dead(&mut self) {
		let before = self.instances.len();
		self.instances.retain(|inst| inst.is_alive());
		let dropped = before - self.instances.len();
		if dropped > 0 {
			log::debug!("dropped {} soft bodies with no entity", dropped);
		}
	}

	// Bodies share nothing, so they can be stepped side by side.
	#[cfg(not(debug_assertions))]
	fn step_all(&mut self) {
		use rayon::prelude::*;
		self.instances.par_iter_mut().for_each(|inst| {
			inst.update();
		});
	}

	#[cfg(debug_assertions)]
	fn step_all(&mut self) {
		self.instances.iter_mut().for_each(|inst| {
			inst.update();
		});
	}

	pub fn update(&mut self) {
		self.drop_dead();
		self.step_all();
	}

	pub fn pr_models(&self) -> Vec<PrModel> {
		self.instances.iter().map(|inst| inst.pr_model()).collect()
	}

	pub fn message(&self) -> Message {
		Message::WorldUpdate(self.pr_models())
	}
}
