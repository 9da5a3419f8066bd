pub mod codec;
pub mod editing;
pub mod error;
pub mod io;
pub mod models;
pub mod plain_text;
pub mod translate;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use codec::{CodecError, decode, encode};
pub use editing::{Bias, Cmd, FieldDocument, Patch};
pub use error::{EditError, PositionFault};
pub use io::*;
pub use models::*;
pub use plain_text::{parse_clipboard_text, parse_plain_text};
