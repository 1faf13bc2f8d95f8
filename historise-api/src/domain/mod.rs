pub mod config;
pub mod field_names;
pub mod options;

pub use config::*;
pub use field_names::*;
pub use options::*;
