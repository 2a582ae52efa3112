//! The HTTP transaction protocol: request encoding, response parsing and
//! decoding, and the connection cycle that ties them together (§4.1, §4.2).

pub mod conn;
pub mod decode;
pub mod encode;
pub mod parse;
pub mod state;

pub use conn::{run, run_to_outcome, Reply};
pub use encode::Method;
pub use state::ConnState;
