pub mod admin;
pub mod auth;
pub mod bootstrap_admin;
pub mod claim;
pub mod conversation;
pub mod email;
pub mod item;
pub mod notification;
pub mod upload;
