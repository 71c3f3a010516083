pub mod globe;
pub mod table;
pub mod tile_map;

pub use globe::*;
pub use table::*;
pub use tile_map::*;
