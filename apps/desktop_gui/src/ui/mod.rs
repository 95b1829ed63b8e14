//! UI layer for the duck generator window.

pub mod app;

pub use app::DuckGeneratorApp;
