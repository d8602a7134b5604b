pub mod access;
pub mod checkin;
pub mod directory;
pub mod subscription;
