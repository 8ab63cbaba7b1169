use crate::V2;
use protocol::pr_model::PrParticle;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub pos: V2,
	pub ppos: V2,
	// external acceleration, cleared every step
	pub accel: V2,
	pub imass: f32,
	pub radius: f32,
}

impl Node {
	/// Non-positive mass or `pinned` yields an immovable node.
	pub fn new(pos: V2, mass: f32, radius: f32, pinned: bool) -> Self {
		let imass = if pinned || mass <= 0.0 || !mass.is_finite() {
			0.0
		} else {
			1.0 / mass
		};
		Self {
			pos,
			ppos: pos,
			accel: V2::zeros(),
			imass,
			radius: radius.max(1.0),
		}
	}

	pub fn get_pos(&self) -> V2 {
		self.pos
	}

	pub fn get_imass(&self) -> f32 {
		self.imass
	}

	pub fn is_pinned(&self) -> bool {
		self.imass == 0.0
	}

	pub fn velocity(&self) -> V2 {
		self.pos - self.ppos
	}

	pub fn add_pos(&mut self, dp: V2) {
		self.pos += dp
	}

	pub fn reset_pos(&mut self, p: V2) {
		self.pos = p;
		self.ppos = p;
	}

	pub fn pin(&mut self, p: V2) {
		self.imass = 0.0;
		self.reset_pos(p);
	}

	/// F = ma, so a += F / m. Pinned nodes ignore forces.
	pub fn add_force(&mut self, force: V2) {
		if self.imass > 0.0 {
			self.accel += force * self.imass;
		}
	}

	pub fn integrate(&mut self, gravity: V2, damping: f32, dt: f32) {
		if self.imass == 0.0 {
			self.accel = V2::zeros();
			return;
		}
		let vel = (self.pos - self.ppos) * damping;
		let ppos = self.pos;
		self.pos += vel + (self.accel + gravity) * dt * dt;
		self.ppos = ppos;
		self.accel = V2::zeros();
	}

	pub fn render(&self) -> PrParticle {
		PrParticle {
			pos: [self.pos[0], self.pos[1]],
		}
	}
}
