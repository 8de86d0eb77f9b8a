// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Routed under /admin behind both `jwt_auth_middleware` and `require_admin`.
pub mod records;
