pub mod detect;
pub mod error;
pub mod parsers;
pub mod translate;
pub mod types;

pub use detect::detect;
pub use error::ToolParseError;
pub use parsers::{parse, parse_as};
pub use types::{Tool, ToolCall, ToolCallFormat};
