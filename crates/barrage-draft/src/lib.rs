// Allocation engine: candidate pool sampling, the normal draft, the
// turn-order auction, and assembly of the finished session record.

pub mod auction;
pub mod draft;
pub mod error;
pub mod players;
pub mod pool;
pub mod result;
pub mod sampler;
pub mod session;

pub use error::{ConfigurationError, SelectionError};
