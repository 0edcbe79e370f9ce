pub mod parser;
pub mod types;
pub mod writer;

pub use parser::{parse, parse_slice};
pub use types::RawReply;
pub use writer::encode_command;
