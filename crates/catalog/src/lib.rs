pub mod config;
pub mod error;
pub mod initial_time;
pub mod interval_index;

pub use config::*;
pub use error::*;
pub use initial_time::*;
pub use interval_index::*;
