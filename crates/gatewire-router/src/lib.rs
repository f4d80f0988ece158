pub mod catalog;
pub mod error;
pub mod router;

pub use catalog::Catalog;
pub use error::GatewayError;
pub use router::Router;
