//! Core data models for streamed search results.

mod demo;
mod filters;
mod university;

pub use demo::demo_universities;
pub use filters::SearchFilters;
pub use university::{University, UniversityKey};
