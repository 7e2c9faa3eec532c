pub mod config;
pub mod diagnosis;
pub mod error;
pub mod llm;
pub mod server;

pub use error::{Error, Result};
