//! Cleanwave request handler
//!
//! One invocation enhances one stored audio file: look up its record, fetch
//! the bytes, run speech enhancement, encode MP3, upload, and record the
//! derived file.

pub mod handler;
pub mod payload;
pub mod response;
pub mod state;

pub use handler::handle_event;
pub use payload::parse_file_id;
pub use response::{HandlerResponse, ResponseBody};
pub use state::AppContext;
