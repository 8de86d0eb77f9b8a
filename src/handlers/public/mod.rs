// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and the public musician catalogue.
pub mod auth;
pub mod resources;
