pub mod clock;
pub mod metrics;
pub mod notifications;

pub use clock::*;
pub use metrics::*;
pub use notifications::*;
