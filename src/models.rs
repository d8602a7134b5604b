pub mod access;
pub mod auth;
pub mod checkin;
pub mod people;
pub mod subscription;
