//! The retrieve -> format -> generate pipeline.

pub mod formatter;
pub mod generator;
pub mod handler;
pub mod retriever;
