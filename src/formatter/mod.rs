pub mod invoke;
pub mod parse;

pub use invoke::{FormatOutcome, FormatRequest, invoke};
pub use parse::{PositionedError, parse_stderr};
