pub mod handlers;
pub mod questions;
pub mod session;
pub mod summary;
