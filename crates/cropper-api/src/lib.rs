//! Cropper API Library
//!
//! This crate provides the HTTP handlers, page rendering and application setup.

mod handlers;
mod views;

pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
