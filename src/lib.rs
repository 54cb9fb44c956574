#![doc = "drive-retitle: batch retitling pipeline for Drive-hosted media."]

//! This crate contains the whole pipeline: folder cataloguing, download,
//! container retitling through the external transcoding tool, upload and
//! durable completion tracking. The binary in `main.rs` is a thin clap
//! wrapper around [`pipeline::run`].
//!
//! # Usage
//! Use as a library through [`pipeline::run`] with any [`contract::RemoteStore`]
//! implementation, or run the `drive-retitle` binary against a YAML config.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod contract;
pub mod drive;
pub mod error;
pub mod load_config;
pub mod logging;
pub mod pipeline;
pub mod tracking;
pub mod transform;
pub mod upload;
pub mod workspace;

pub use cli::{run, Cli, Commands};
