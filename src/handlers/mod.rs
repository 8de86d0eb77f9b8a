// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (bearer auth) → Elevated (bearer auth + admin role)
pub mod body;
pub mod elevated;
pub mod params;
pub mod protected;
pub mod public;

pub use body::JsonBody;
pub use params::ListParams;
