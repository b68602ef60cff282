pub mod format;
pub mod table;

mod errors;

pub use errors::ExportError;
pub use format::format_delta;
pub use table::{to_csv, TrailingColumn};
