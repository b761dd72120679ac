pub mod export;
pub mod request;

pub use export::{export_teesheet_to_csv, export_teesheet_to_string};
pub use request::{validate_request, RemapRequest};
