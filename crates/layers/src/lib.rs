pub mod error;
pub mod layer;
pub mod raster;
pub mod slot;
pub mod symbology;
pub mod time_dynamic;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use error::*;
pub use layer::*;
pub use raster::*;
pub use slot::*;
pub use symbology::*;
pub use time_dynamic::*;
pub use viewer::*;
