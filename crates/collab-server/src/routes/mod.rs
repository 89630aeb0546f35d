pub mod comments;
pub mod events;
pub mod feedback;
pub mod health;
pub mod plans;
pub mod questions;
