pub mod admin;
pub mod auth;
pub mod claim;
pub mod conversation;
pub mod item;
pub mod notification;
pub mod upload;

pub use auth::*;
