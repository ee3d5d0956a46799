pub mod chat;
pub mod profile;
pub mod rating;
pub mod session;
