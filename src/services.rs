pub mod access_service;
pub mod auth;
pub mod checkin_service;
pub mod directory_service;
pub mod subscription_service;

pub use access_service::AccessService;
pub use auth::AuthService;
pub use checkin_service::CheckinService;
pub use directory_service::DirectoryService;
pub use subscription_service::SubscriptionService;
