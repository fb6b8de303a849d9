pub mod error;
pub mod extract;
pub mod types;

pub use error::handler_404;
pub use error::internal_error;
