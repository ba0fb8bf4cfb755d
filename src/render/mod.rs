//! Rendering module for turning analysis results into output text.

mod json;
mod report;

pub use json::{to_json, JsonFormat};
pub use report::to_report;
