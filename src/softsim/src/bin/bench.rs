use std::sync::Arc;
use std::time::SystemTime;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use softsim::collision::{Tile, TileMap};
use softsim::instance::SoftbodyInstance;
use softsim::lattice::{build_circular, build_rectangular_shell};
use softsim::system::SoftbodySystem;
use softsim::{Material, Simulation, C2, V2};

fn main() {
	env_logger::init();
	let mut rng = StdRng::seed_from_u64(7);
	let mut map = TileMap::default();
	map.fill(C2::new(-10, 40), C2::new(110, 42), Tile::SOLID);
	let field = Arc::new(map);

	let mut system = SoftbodySystem::default();
	for idx in 0..40 {
		let origin = V2::new(rng.gen_range(0.0..1600.0), rng.gen_range(0.0..400.0));
		let material = Material::preset(Material::presets()[idx % 4])
			.unwrap_or_default();
		let mut sim = Simulation::default()
			.with_material(material.clone())
			.with_tile_field(field.clone());
		let grid = if idx % 2 == 0 {
			build_circular(&mut sim, origin, 9, 8.0, 1.0, 4.0)
		} else {
			build_rectangular_shell(&mut sim, origin, 8, 8, 8.0, 2.0, 1.0, 4.0)
		};
		match grid {
			Ok(grid) => system.add(SoftbodyInstance::new(sim, grid, material)),
			Err(e) => eprintln!("ERROR: {}", e),
		}
	}

	let start = SystemTime::now();
	let rframes = 600;
	for _ in 0..rframes {
		system.update();
	}
	let duration = SystemTime::now()
		.duration_since(start)
		.map(|d| d.as_micros())
		.unwrap_or_default();
	eprintln!(
		"{} bodies, {:.1}us/frame",
		system.len(),
		duration as f32 / rframes as f32
	);
}
