//! Solver coefficients and the preset library.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintKind;
use crate::error::SimError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
	pub iterations: usize,
	pub damping: f32,
	pub gravity_scale: f32,

	// collision response, both in [0, 1]
	pub friction: f32,
	pub bounce: f32,

	// stiffness multipliers
	pub structural_stiffness: f32,
	pub bend_stiffness: f32,
	pub area_stiffness: f32,
	/// Only read when shear links are created; baked into each link.
	pub shear_stiffness: f32,
	pub attachment_stiffness: f32,
}

impl Default for Material {
	fn default() -> Self {
		Self {
			iterations: 6,
			damping: 0.995,
			gravity_scale: 1.0,
			friction: 0.15,
			bounce: 0.0,
			structural_stiffness: 1.0,
			bend_stiffness: 1.0,
			area_stiffness: 1.0,
			shear_stiffness: 1.0,
			attachment_stiffness: 1.0,
		}
	}
}

const PRESETS: [&str; 4] = ["cloth", "jelly", "rubber", "flesh"];

impl Material {
	pub fn cloth() -> Self {
		Self {
			iterations: 5,
			damping: 0.99,
			gravity_scale: 1.0,
			friction: 0.1,
			bounce: 0.0,
			structural_stiffness: 0.6,
			shear_stiffness: 0.5,
			bend_stiffness: 0.2,
			area_stiffness: 0.0,
			attachment_stiffness: 0.35,
		}
	}

	pub fn jelly() -> Self {
		Self {
			iterations: 4,
			damping: 0.8,
			gravity_scale: 0.0,
			friction: 0.2,
			bounce: 1.0,
			structural_stiffness: 0.04,
			shear_stiffness: 0.05,
			bend_stiffness: 0.0,
			area_stiffness: 0.06,
			attachment_stiffness: 0.5,
		}
	}

	pub fn rubber() -> Self {
		Self {
			iterations: 6,
			damping: 0.995,
			gravity_scale: 1.0,
			friction: 0.3,
			bounce: 0.2,
			structural_stiffness: 0.75,
			shear_stiffness: 0.6,
			bend_stiffness: 0.3,
			area_stiffness: 0.0,
			attachment_stiffness: 0.5,
		}
	}

	pub fn flesh() -> Self {
		Self {
			iterations: 4,
			damping: 0.98,
			gravity_scale: 1.0,
			friction: 0.4,
			bounce: 0.0,
			structural_stiffness: 0.5,
			shear_stiffness: 0.4,
			bend_stiffness: 0.1,
			area_stiffness: 0.3,
			attachment_stiffness: 0.3,
		}
	}

	pub fn presets() -> &'static [&'static str] {
		&PRESETS
	}

	/// Look a preset up by name, ignoring case. The result is an owned copy.
	pub fn preset(name: &str) -> Result<Self, SimError> {
		match name.to_ascii_lowercase().as_str() {
			"cloth" => Ok(Self::cloth()),
			"jelly" => Ok(Self::jelly()),
			"rubber" => Ok(Self::rubber()),
			"flesh" => Ok(Self::flesh()),
			_ => Err(SimError::UnknownPreset(name.to_string())),
		}
	}

	pub fn with_iterations(mut self, iterations: usize) -> Self {
		self.iterations = iterations;
		self
	}

	pub fn with_damping(mut self, damping: f32) -> Self {
		self.damping = damping;
		self
	}

	pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
		self.gravity_scale = gravity_scale;
		self
	}

	pub fn with_contact(mut self, friction: f32, bounce: f32) -> Self {
		self.friction = friction;
		self.bounce = bounce;
		self
	}

	/// Live multiplier applied to a distance link of the given kind.
	///
	/// Shear links share the structural multiplier; their own shear
	/// coefficient was already baked in when the link was created.
	pub fn kind_multiplier(&self, kind: ConstraintKind) -> f32 {
		match kind {
			ConstraintKind::Structural | ConstraintKind::Shear => {
				self.structural_stiffness
			}
			ConstraintKind::Bend => self.bend_stiffness,
			ConstraintKind::Custom => 1.0,
		}
	}

	pub fn validate(&self) -> Result<(), SimError> {
		let unit = [("friction", self.friction), ("bounce", self.bounce)];
		for (field, value) in unit {
			if !(0.0..=1.0).contains(&value) {
				return Err(SimError::InvalidMaterial { field, value });
			}
		}
		let non_negative = [
			("damping", self.damping),
			("gravity_scale", self.gravity_scale),
			("structural_stiffness", self.structural_stiffness),
			("bend_stiffness", self.bend_stiffness),
			("area_stiffness", self.area_stiffness),
			("shear_stiffness", self.shear_stiffness),
			("attachment_stiffness", self.attachment_stiffness),
		];
		for (field, value) in non_negative {
			if !value.is_finite() || value < 0.0 {
				return Err(SimError::InvalidMaterial { field, value });
			}
		}
		if self.iterations == 0 {
			return Err(SimError::InvalidMaterial {
				field: "iterations",
				value: 0.0,
			});
		}
		Ok(())
	}

	/// Clamp every coefficient into its usable range.
	pub fn sanitized(mut self) -> Self {
		fn clamp(field: &str, value: &mut f32, lo: f32, hi: f32) {
			let v = if value.is_finite() { value.clamp(lo, hi) } else { lo };
			if v != *value {
				log::warn!("material: {} {} clamped to {}", field, value, v);
				*value = v;
			}
		}
		clamp("friction", &mut self.friction, 0.0, 1.0);
		clamp("bounce", &mut self.bounce, 0.0, 1.0);
		clamp("damping", &mut self.damping, 0.0, f32::MAX);
		clamp("structural_stiffness", &mut self.structural_stiffness, 0.0, f32::MAX);
		clamp("bend_stiffness", &mut self.bend_stiffness, 0.0, f32::MAX);
		clamp("area_stiffness", &mut self.area_stiffness, 0.0, f32::MAX);
		clamp("shear_stiffness", &mut self.shear_stiffness, 0.0, f32::MAX);
		clamp("attachment_stiffness", &mut self.attachment_stiffness, 0.0, f32::MAX);
		if self.iterations == 0 {
			log::warn!("material: iterations 0 raised to 1");
			self.iterations = 1;
		}
		self
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_presets_validate() {
		for name in Material::presets() {
			let m = Material::preset(name).unwrap();
			m.validate().unwrap();
		}
		Material::default().validate().unwrap();
	}

	#[test]
	fn test_preset_lookup() {
		assert_eq!(Material::preset("Jelly").unwrap(), Material::jelly());
		assert_eq!(
			Material::preset("slime"),
			Err(SimError::UnknownPreset("slime".to_string()))
		);
		let cloth = Material::cloth();
		assert_eq!(cloth.iterations, 5);
		assert!((cloth.shear_stiffness - 0.5).abs() < 1e-6);
		assert!((Material::flesh().area_stiffness - 0.3).abs() < 1e-6);
	}

	#[test]
	fn test_tuning_table() {
		let flesh = Material::flesh();
		let text = toml::to_string(&flesh).unwrap();
		let back: Material = toml::from_str(&text).unwrap();
		assert_eq!(back, flesh);

		// missing keys fall back to the defaults
		let partial: Material = toml::from_str("friction = 0.5\niterations = 9\n").unwrap();
		assert_eq!(
			partial,
			Material {
				friction: 0.5,
				iterations: 9,
				..Material::default()
			}
		);
	}

	#[test]
	fn test_kind_multiplier() {
		let m = Material::rubber();
		assert_eq!(m.kind_multiplier(ConstraintKind::Shear), 0.75);
		assert_eq!(m.kind_multiplier(ConstraintKind::Structural), 0.75);
		assert_eq!(m.kind_multiplier(ConstraintKind::Bend), 0.3);
		assert_eq!(m.kind_multiplier(ConstraintKind::Custom), 1.0);
	}

	#[test]
	fn test_sanitized() {
		let m = Material::default()
			.with_contact(1.5, -0.2)
			.with_iterations(0)
			.sanitized();
		assert_eq!(m.friction, 1.0);
		assert_eq!(m.bounce, 0.0);
		assert_eq!(m.iterations, 1);
		m.validate().unwrap();
		let bad = Material::default().with_contact(2.0, 0.0);
		assert!(matches!(
			bad.validate(),
			Err(SimError::InvalidMaterial { field: "friction", .. })
		));
	}
}
