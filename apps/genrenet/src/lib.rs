//! # genrenet
//!
//! Application layer of genrenet: command line, configuration loading,
//! HTTP transport and graph rendering over `genrenet-core`.

pub mod cli;
pub mod config;
pub mod render;
pub mod transport;
