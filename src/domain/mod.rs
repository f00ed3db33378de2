pub mod error;
pub mod repository;
pub mod ticket;
pub mod user;
