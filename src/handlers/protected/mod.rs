// handlers/protected/mod.rs - Protected handlers (bearer authentication required)
//
// Every handler here runs behind `jwt_auth_middleware` and receives the
// authenticated subject as `Extension<AuthUser>`.
pub mod auth;
pub mod records;
pub mod resources;
pub mod users;
