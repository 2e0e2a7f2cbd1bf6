//! Engine module: request validation, file scanning, cancellation, CLI.

pub mod arg_parser;
pub mod cancel;
pub mod handlers;
pub mod scanner;
pub mod tools;
pub mod validate;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cancel::CancelToken;
pub use handlers::handle_run;
pub use scanner::LineMatches;
pub use tools::{is_hidden, is_readable, is_under_prefix, path_relative_to, running_as_root};
pub use validate::validate_request;
