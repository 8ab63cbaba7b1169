//! Collision against a static tile grid.
//!
//! The grid itself lives outside the solver; it is reached through
//! [`TileField`]. Cell `(x, y)` covers `[x, x + 1) * cell_size` on each axis.

use fnv::FnvHashMap;

use crate::node::Node;
use crate::{C2, V2};

pub const TILE_SIZE: f32 = 16.0;

const MIN_CONTACT: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
	pub solid: bool,
	// one-way surfaces; never collide with soft bodies
	pub platform_top: bool,
}

impl Tile {
	pub const EMPTY: Self = Self {
		solid: false,
		platform_top: false,
	};
	pub const SOLID: Self = Self {
		solid: true,
		platform_top: false,
	};
	pub const PLATFORM: Self = Self {
		solid: true,
		platform_top: true,
	};

	pub fn blocks(self) -> bool {
		self.solid && !self.platform_top
	}
}

/// Read-only occupancy query.
pub trait TileField: Send + Sync {
	fn tile(&self, cell: C2) -> Tile;

	/// Inclusive cell range outside of which nothing is queried.
	fn bounds(&self) -> Option<(C2, C2)> {
		None
	}

	fn cell_size(&self) -> f32 {
		TILE_SIZE
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyField;

impl TileField for EmptyField {
	fn tile(&self, _cell: C2) -> Tile {
		Tile::EMPTY
	}
}

/// Sparse tile storage; cells never set are empty.
#[derive(Clone, Debug)]
pub struct TileMap {
	csize: f32,
	bounds: Option<(C2, C2)>,
	data: FnvHashMap<C2, Tile>,
}

impl Default for TileMap {
	fn default() -> Self {
		Self {
			csize: TILE_SIZE,
			bounds: None,
			data: FnvHashMap::default(),
		}
	}
}

impl TileMap {
	pub fn with_cell_size(mut self, csize: f32) -> Self {
		self.csize = csize;
		self
	}

	pub fn with_bounds(mut self, min: C2, max: C2) -> Self {
		self.bounds = Some((min, max));
		self
	}

	pub fn get_cpos(&self, p: V2) -> C2 {
		C2::new(
			(p[0] / self.csize).floor() as i32,
			(p[1] / self.csize).floor() as i32,
		)
	}

	pub fn set(&mut self, cell: C2, tile: Tile) {
		if tile == Tile::EMPTY {
			self.data.remove(&cell);
		} else {
			self.data.insert(cell, tile);
		}
	}

	/// Fill the inclusive cell rectangle `min..=max`.
	pub fn fill(&mut self, min: C2, max: C2, tile: Tile) {
		for x in min[0]..=max[0] {
			for y in min[1]..=max[1] {
				self.set(C2::new(x, y), tile);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

impl TileField for TileMap {
	fn tile(&self, cell: C2) -> Tile {
		self.data.get(&cell).copied().unwrap_or_default()
	}

	fn bounds(&self) -> Option<(C2, C2)> {
		self.bounds
	}

	fn cell_size(&self) -> f32 {
		self.csize
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactResponse {
	pub friction: f32,
	pub bounce: f32,
	/// Push direction for a node whose center sits on or inside a cell
	/// while not moving.
	pub up: V2,
}

fn axis_snap(v: V2) -> Option<V2> {
	if v[0] == 0.0 && v[1] == 0.0 {
		None
	} else if v[0].abs() > v[1].abs() {
		Some(V2::new(v[0].signum(), 0.))
	} else {
		Some(V2::new(0., v[1].signum()))
	}
}

// normal and depth for a center lying on or inside the cell rectangle
fn inside_contact(
	pos: V2,
	motion: V2,
	min: V2,
	max: V2,
	r: f32,
	up: V2,
) -> (V2, f32) {
	let normal = axis_snap(-motion)
		.or_else(|| axis_snap(up))
		.unwrap_or_else(|| V2::new(0., -1.));
	let face = if normal[0] < 0.0 {
		pos[0] - min[0]
	} else if normal[0] > 0.0 {
		max[0] - pos[0]
	} else if normal[1] < 0.0 {
		pos[1] - min[1]
	} else {
		max[1] - pos[1]
	};
	(normal, face.max(0.0) + r)
}

/// Push one node out of every blocking cell it overlaps and apply the
/// contact velocity response. Returns the number of contacts resolved.
pub fn collide_node(
	node: &mut Node,
	field: &dyn TileField,
	response: &ContactResponse,
) -> usize {
	// a blown-up node has no meaningful cell to be pushed out of
	if node.is_pinned() || !node.pos.iter().all(|v| v.is_finite()) {
		return 0;
	}
	let r = node.radius;
	let csize = field.cell_size();
	let cell = |v: f32| (v / csize).floor() as i32;
	let mut lo = C2::new(
		cell(node.pos[0] - r).saturating_sub(1),
		cell(node.pos[1] - r).saturating_sub(1),
	);
	let mut hi = C2::new(
		cell(node.pos[0] + r).saturating_add(1),
		cell(node.pos[1] + r).saturating_add(1),
	);
	if let Some((bmin, bmax)) = field.bounds() {
		for k in 0..2 {
			lo[k] = lo[k].max(bmin[k]);
			hi[k] = hi[k].min(bmax[k]);
		}
	}

	let friction = response.friction.clamp(0.0, 1.0);
	let bounce = response.bounce.clamp(0.0, 1.0);
	let mut pos = node.pos;
	let mut ppos = node.ppos;
	let mut contacts = 0;
	for tx in lo[0]..=hi[0] {
		for ty in lo[1]..=hi[1] {
			if !field.tile(C2::new(tx, ty)).blocks() {
				continue;
			}
			let min = V2::new(tx as f32, ty as f32) * csize;
			let max = min + V2::repeat(csize);
			let nearest = V2::new(
				pos[0].clamp(min[0], max[0]),
				pos[1].clamp(min[1], max[1]),
			);
			let to_circle = pos - nearest;
			let d2 = to_circle.magnitude_squared();
			if d2 > r * r {
				continue;
			}
			let (normal, pen) = if d2 < MIN_CONTACT {
				inside_contact(pos, pos - ppos, min, max, r, response.up)
			} else {
				let d = d2.sqrt();
				(to_circle / d, r - d)
			};
			if pen <= 0.0 {
				continue;
			}

			let vel = pos - ppos;
			pos += normal * pen;
			let vn = vel.dot(&normal);
			let vel = if vn < 0.0 {
				let normal_vel = normal * vn;
				let tangent_vel = vel - normal_vel;
				tangent_vel * (1.0 - friction) - normal_vel * bounce
			} else {
				vel
			};
			ppos = pos - vel;
			contacts += 1;
		}
	}
	node.pos = pos;
	node.ppos = ppos;
	contacts
}

#[cfg(test)]
mod test {
	use super::*;

	fn floor_map() -> TileMap {
		// one solid row, cells y = 2, top edge at y = 32
		let mut map = TileMap::default();
		map.fill(C2::new(-4, 2), C2::new(4, 2), Tile::SOLID);
		map
	}

	fn response(friction: f32, bounce: f32) -> ContactResponse {
		ContactResponse {
			friction,
			bounce,
			up: V2::new(0., -1.),
		}
	}

	#[test]
	fn test_push_out_of_floor() {
		let map = floor_map();
		let mut node = Node::new(V2::new(8., 30.), 1.0, 4.0, false);
		node.ppos = V2::new(6., 27.);
		let n = collide_node(&mut node, &map, &response(0.0, 0.0));
		assert_eq!(n, 1);
		assert!((node.pos[1] - 28.).abs() < 1e-4);
		// inward part removed, tangential part kept
		let v = node.velocity();
		assert!(v[1].abs() < 1e-4);
		assert!((v[0] - 2.).abs() < 1e-4);
	}

	#[test]
	fn test_far_away_nodes_are_ignored() {
		let mut map = floor_map();
		map.set(C2::new(i32::MAX, i32::MAX), Tile::SOLID);
		let response = response(0.0, 0.0);
		for p in [
			V2::new(1e12, 1e12),
			V2::new(-1e12, -1e12),
			V2::new(f32::INFINITY, 30.),
			V2::new(f32::NAN, 30.),
		] {
			let mut node = Node::new(p, 1.0, 4.0, false);
			let _ = collide_node(&mut node, &map, &response);
		}
		let mut node = Node::new(V2::new(f32::NEG_INFINITY, 30.), 1.0, 4.0, false);
		assert_eq!(collide_node(&mut node, &map, &response), 0);
		assert_eq!(node.pos[0], f32::NEG_INFINITY);
	}

	#[test]
	fn test_bounce_and_friction() {
		let map = floor_map();
		let mut node = Node::new(V2::new(8., 30.), 1.0, 4.0, false);
		node.ppos = V2::new(6., 26.);
		collide_node(&mut node, &map, &response(0.5, 1.0));
		let v = node.velocity();
		assert!((v[0] - 1.).abs() < 1e-4);
		assert!((v[1] + 4.).abs() < 1e-4);
	}

	#[test]
	fn test_platform_and_empty_ignored() {
		let mut map = TileMap::default();
		map.set(C2::new(0, 0), Tile::PLATFORM);
		let mut node = Node::new(V2::new(8., 8.), 1.0, 4.0, false);
		assert_eq!(collide_node(&mut node, &map, &response(0., 0.)), 0);
		assert_eq!(collide_node(&mut node, &EmptyField, &response(0., 0.)), 0);
		assert_eq!(node.pos, V2::new(8., 8.));
		map.set(C2::new(0, 0), Tile::EMPTY);
		assert!(map.is_empty());
	}

	#[test]
	fn test_center_inside_uses_motion() {
		let map = floor_map();
		// fell into the top of the row, moving down
		let mut node = Node::new(V2::new(8., 34.), 1.0, 4.0, false);
		node.ppos = V2::new(8., 31.);
		collide_node(&mut node, &map, &response(0., 0.));
		assert!(node.pos[1] <= 28. + 1e-4);
		assert!(node.velocity()[1] <= 1e-4);
	}

	#[test]
	fn test_resting_center_inside_uses_up() {
		let map = floor_map();
		let mut node = Node::new(V2::new(8., 33.), 1.0, 2.0, false);
		collide_node(&mut node, &map, &response(0., 0.));
		assert!((node.pos[1] - 30.).abs() < 1e-4);
	}

	#[test]
	fn test_bounds_limit_query() {
		let map = floor_map().with_bounds(C2::new(0, 0), C2::new(1, 1));
		let mut node = Node::new(V2::new(8., 30.), 1.0, 4.0, false);
		assert_eq!(collide_node(&mut node, &map, &response(0., 0.)), 0);
	}

	#[test]
	fn test_pinned_untouched() {
		let map = floor_map();
		let mut node = Node::new(V2::new(8., 33.), 1.0, 4.0, true);
		assert_eq!(collide_node(&mut node, &map, &response(0., 0.)), 0);
		assert_eq!(node.pos, V2::new(8., 33.));
	}

	#[test]
	fn test_get_cpos() {
		let map = TileMap::default();
		assert_eq!(map.get_cpos(V2::new(-1., 17.)), C2::new(-1, 1));
	}
}
