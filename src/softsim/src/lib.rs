pub mod collision;
pub mod constraint;
pub mod error;
pub mod instance;
pub mod lattice;
pub mod material;
pub mod node;
pub mod simulation;
pub mod system;

pub type V2 = nalgebra::Vector2<f32>;
pub type C2 = nalgebra::Vector2<i32>;

pub use error::SimError;
pub use material::Material;
pub use simulation::Simulation;
