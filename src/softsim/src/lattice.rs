//! Lattice builders: lay nodes out on a grid and wire structural, shear,
//! area and bend constraints between them.

use crate::constraint::ConstraintKind;
use crate::error::SimError;
use crate::simulation::Simulation;
use crate::V2;

/// Maps lattice coordinates to node ids. Cells without a node are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeGrid {
	width: usize,
	height: usize,
	ids: Vec<Option<usize>>,
}

impl LatticeGrid {
	fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			ids: vec![None; width * height],
		}
	}

	pub fn width(&self) -> usize {
		self.width
	}

	pub fn height(&self) -> usize {
		self.height
	}

	/// `None` for absent cells and for coordinates outside the grid.
	pub fn get(&self, x: usize, y: usize) -> Option<usize> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.ids[x * self.height + y]
	}

	fn set(&mut self, x: usize, y: usize, id: usize) {
		self.ids[x * self.height + y] = Some(id);
	}

	pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
		self.ids.iter().flatten().copied()
	}

	pub fn len(&self) -> usize {
		self.node_ids().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn quad(&self, x: usize, y: usize) -> Option<[usize; 4]> {
		Some([
			self.get(x, y)?,
			self.get(x + 1, y)?,
			self.get(x, y + 1)?,
			self.get(x + 1, y + 1)?,
		])
	}

	/// Two triangles per fully populated quad: (a, b, c) and (b, d, c).
	pub fn triangles(&self) -> Vec<[usize; 3]> {
		let mut result = Vec::new();
		for x in 0..self.width.saturating_sub(1) {
			for y in 0..self.height.saturating_sub(1) {
				if let Some([a, b, c, d]) = self.quad(x, y) {
					result.push([a, b, c]);
					result.push([b, d, c]);
				}
			}
		}
		result
	}
}

fn check_spacing(spacing: f32) -> Result<(), SimError> {
	if spacing.is_finite() && spacing > 0.0 {
		Ok(())
	} else {
		Err(SimError::InvalidSpacing(spacing))
	}
}

fn link(
	sim: &mut Simulation,
	a: Option<usize>,
	b: Option<usize>,
	stiffness: f32,
	kind: ConstraintKind,
) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => {
			sim.add_link(a, b, stiffness, kind);
			true
		}
		_ => false,
	}
}

// Stiffness is read from the material once, here.
fn connect(sim: &mut Simulation, grid: &LatticeGrid) -> usize {
	use ConstraintKind::{Bend, Shear, Structural};

	let material = sim.material().clone();
	let (w, h) = (grid.width, grid.height);
	let g = |x: usize, y: usize| grid.get(x, y);
	let mut links = 0;

	for x in 0..w {
		for y in 0..h {
			let s = material.structural_stiffness;
			links += link(sim, g(x, y), g(x + 1, y), s, Structural) as usize;
			links += link(sim, g(x, y), g(x, y + 1), s, Structural) as usize;
		}
	}
	for x in 0..w.saturating_sub(1) {
		for y in 0..h.saturating_sub(1) {
			let s = material.shear_stiffness;
			links += link(sim, g(x, y), g(x + 1, y + 1), s, Shear) as usize;
			links += link(sim, g(x + 1, y), g(x, y + 1), s, Shear) as usize;
		}
	}
	for [a, b, c] in grid.triangles() {
		sim.add_area(a, b, c, material.area_stiffness);
	}
	for x in 0..w {
		for y in 0..h {
			let s = material.bend_stiffness;
			links += link(sim, g(x, y), g(x + 2, y), s, Bend) as usize;
			links += link(sim, g(x, y), g(x, y + 2), s, Bend) as usize;
		}
	}
	links
}

fn build_with<F>(
	sim: &mut Simulation,
	shape: &str,
	(width, height): (usize, usize),
	radius: f32,
	mut place: F,
) -> LatticeGrid
where
	F: FnMut(usize, usize) -> Option<(V2, f32)>,
{
	let mut grid = LatticeGrid::new(width, height);
	for x in 0..width {
		for y in 0..height {
			if let Some((pos, mass)) = place(x, y) {
				grid.set(x, y, sim.add_node(pos, mass, radius, false));
			}
		}
	}
	let links = connect(sim, &grid);
	log::info!(
		"built {} lattice {}x{}: {} nodes, {} links",
		shape,
		width,
		height,
		grid.len(),
		links
	);
	grid
}

/// `width * height` nodes at `origin + (x, y) * spacing`.
pub fn build_rectangular(
	sim: &mut Simulation,
	origin: V2,
	width: usize,
	height: usize,
	spacing: f32,
	node_mass: f32,
	radius: f32,
) -> Result<LatticeGrid, SimError> {
	check_spacing(spacing)?;
	Ok(build_with(sim, "rectangular", (width, height), radius, |x, y| {
		let pos = origin + V2::new(x as f32, y as f32) * spacing;
		Some((pos, node_mass))
	}))
}

/// Like [`build_rectangular`], but boundary nodes weigh `shell_mass` and
/// interior nodes `interior_mass`.
#[allow(clippy::too_many_arguments)]
pub fn build_rectangular_shell(
	sim: &mut Simulation,
	origin: V2,
	width: usize,
	height: usize,
	spacing: f32,
	shell_mass: f32,
	interior_mass: f32,
	radius: f32,
) -> Result<LatticeGrid, SimError> {
	check_spacing(spacing)?;
	Ok(build_with(sim, "shell", (width, height), radius, |x, y| {
		let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
		let mass = if edge { shell_mass } else { interior_mass };
		let pos = origin + V2::new(x as f32, y as f32) * spacing;
		Some((pos, mass))
	}))
}

/// Disc of nodes: a `diameter_nodes` square grid centerd on `center`,
/// keeping only cells within `(diameter_nodes - 1) * spacing / 2` of it.
pub fn build_circular(
	sim: &mut Simulation,
	center: V2,
	diameter_nodes: usize,
	spacing: f32,
	mass: f32,
	radius: f32,
) -> Result<LatticeGrid, SimError> {
	check_spacing(spacing)?;
	let half = diameter_nodes.saturating_sub(1) as f32 * 0.5;
	let world_radius = half * spacing;
	let size = (diameter_nodes, diameter_nodes);
	Ok(build_with(sim, "circular", size, radius, |x, y| {
		let offset = V2::new(x as f32 - half, y as f32 - half) * spacing;
		let pos = center + offset;
		((pos - center).magnitude() <= world_radius).then_some((pos, mass))
	}))
}
