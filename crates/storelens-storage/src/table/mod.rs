//! Generic CSV table reading and writing.

pub mod reader;
pub mod writer;

pub use reader::{parse_flag, require_input, Row, Table};
pub use writer::{bit, fixed, opt, opt_fixed, TableWriter};
