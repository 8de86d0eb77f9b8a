pub mod record_service;
pub mod resource_service;
pub mod user_service;

pub use record_service::RecordService;
pub use resource_service::ResourceService;
pub use user_service::{ProfileUpdate, SignupRequest, UserService};
