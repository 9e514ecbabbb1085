//! Terminal application driving one `DropdownTable`.

mod runtime;
mod terminal;

pub use runtime::run;

/// Boxed error used across the binary.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
