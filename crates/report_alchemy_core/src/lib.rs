//! # report_alchemy_core
//!
//! Core engine for report-alchemy.
//!
//! This crate provides:
//! - The `Problem` report model
//! - The plugin contract (handler loaders, source and sink handlers)
//! - Handler resolution across an ordered plugin list
//! - The read/write pipeline that streams problems from sources to sinks
//! - Configuration loading and discovery
//!
//! ## Example
//!
//! ```rust,ignore
//! use report_alchemy_core::{load_configuration, run_report_alchemy};
//!
//! let config = load_configuration(None, &std::env::current_dir()?).await?;
//! run_report_alchemy(&config, &plugins).await?;
//! ```

mod config;
mod error;
pub mod io;
mod pipeline;
mod plugin;
mod problem;
mod registry;
mod report;
pub mod resolver;
mod runner;
pub mod typeguard;

pub use config::{CONFIG_FILENAMES, Configuration, load_configuration};
pub use error::AlchemyError;
pub use pipeline::{ProblemStream, read_problems, write_problems};
pub use plugin::{
    HandlerFuture, HandlerLoader, HandlerLoaderMap, HandlerMap, Plugin, ProblemIter, SinkHandler,
    SinkInput, SinkLoader, SinkWriter, SourceHandler, SourceLoader, loader,
};
pub use problem::{FrozenProblem, Position, Problem, Severity, freeze};
pub use registry::PluginRegistry;
pub use report::{HandlerOptions, OptionValue, ReportEndpoint, ReportSink, ReportSource};
pub use resolver::{resolve_handler_loaders, resolve_handlers};
pub use runner::run_report_alchemy;
