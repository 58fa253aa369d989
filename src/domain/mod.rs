pub mod auth;
pub mod message;
pub mod store;
pub mod user;
