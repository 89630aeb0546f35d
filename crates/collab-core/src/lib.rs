pub mod config;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod hash;
pub mod io;
pub mod paths;
pub mod plan;
pub mod registry;
pub mod version;

pub use error::{CollabError, Result};
