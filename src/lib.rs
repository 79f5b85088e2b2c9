//! Terminal replay of stratospheric balloon flights over the last day.

pub mod colors;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod headless;
pub mod overlay;
pub mod settings;
pub mod terminal;
pub mod viz;
