// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f
#![allow(clippy::format_in_format_args)] // Nested format! can be clearer for complex strings

// Module declarations
pub mod client;
pub mod config;
pub mod dispatch;
pub mod file_storage;
pub mod models;
pub mod providers;
pub mod shutdown;
pub mod templates;
pub mod utils;

// Server module (HTTP API)
pub mod server;

pub use dispatch::{DispatchError, DispatchResponse, Dispatcher};
pub use models::{AnalysisRequest, AnalysisResult, Mode};
