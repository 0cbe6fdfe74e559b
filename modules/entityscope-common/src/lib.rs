pub mod config;
pub mod error;
pub mod form;
pub mod persona;
pub mod types;

pub use config::Config;
pub use error::EntityScopeError;
pub use form::{AnalysisForm, CompetitorEntry, LeaderEntry};
pub use persona::Persona;
pub use types::*;
