pub mod error;
pub mod types;

pub use error::RequestError;
pub use types::*;
