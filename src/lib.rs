//! Bookshelf application library
//!
//! The book catalogue module plus the bootstrap shared by the server binary
//! and the `bookshelf` CLI.

pub mod app;
pub mod modules;

pub use app::App;
