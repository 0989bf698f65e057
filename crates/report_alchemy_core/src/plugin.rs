//! Plugin contract.
//!
//! A plugin supplies named *loaders* for source and sink handlers. A loader
//! is a deferred factory: calling it starts whatever work is needed to build
//! the handler and returns a future resolving to it. Loaders are not
//! memoized, so callers must invoke each one at most once per run.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::{AlchemyError, HandlerOptions, Problem};

/// A lazy, forward-only sequence of problems produced by a source handler.
pub type ProblemIter = Box<dyn Iterator<Item = Result<Problem, AlchemyError>> + Send>;

/// Reads problems out of a fully buffered report.
pub trait SourceHandler: Send + Sync {
    /// Parses `buffer` and returns the problems it describes.
    ///
    /// Fails with [`AlchemyError::InvalidSourceData`] if the buffer does not
    /// match the expected format.
    fn read(&self, buffer: Vec<u8>, options: &HandlerOptions) -> Result<ProblemIter, AlchemyError>;
}

/// Input fed to a [`SinkWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkInput<'a> {
    /// The next problem in the stream.
    Problem(&'a Problem),
    /// No more problems will follow.
    End,
}

/// Stateful writer returned by a [`SinkHandler`].
///
/// Receives problems one at a time, then a single [`SinkInput::End`]. The
/// terminal form of the report must not be written before `End` arrives.
/// The pipeline flushes the destination after `End` has been accepted.
pub trait SinkWriter: Send {
    fn accept(&mut self, input: SinkInput<'_>) -> Result<(), AlchemyError>;
}

/// Writes problems to a report.
pub trait SinkHandler: Send + Sync {
    /// Starts a report on `destination`, writing any prologue immediately.
    fn open(
        &self,
        destination: Box<dyn Write + Send>,
        options: &HandlerOptions,
    ) -> Result<Box<dyn SinkWriter>, AlchemyError>;
}

/// Future returned by a handler loader.
pub type HandlerFuture<H> = BoxFuture<'static, Result<H, AlchemyError>>;

/// A deferred factory producing a handler.
pub type HandlerLoader<H> = Arc<dyn Fn() -> HandlerFuture<H> + Send + Sync>;

/// Loader for a source handler.
pub type SourceLoader = HandlerLoader<Arc<dyn SourceHandler>>;

/// Loader for a sink handler.
pub type SinkLoader = HandlerLoader<Arc<dyn SinkHandler>>;

/// Map from source/sink type names to loaders.
pub type HandlerLoaderMap<H> = HashMap<String, HandlerLoader<H>>;

/// Map from source/sink type names to loaded handlers.
pub type HandlerMap<H> = HashMap<String, H>;

/// Wraps an async factory into a [`HandlerLoader`].
pub fn loader<H, F, Fut>(factory: F) -> HandlerLoader<H>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<H, AlchemyError>> + Send + 'static,
{
    Arc::new(move || factory().boxed())
}

/// A bundle of source and sink loaders keyed by type name.
#[derive(Clone, Default)]
pub struct Plugin {
    /// Loaders for reading report types.
    pub source_handlers: Option<HandlerLoaderMap<Arc<dyn SourceHandler>>>,
    /// Loaders for writing report types.
    pub sink_handlers: Option<HandlerLoaderMap<Arc<dyn SinkHandler>>>,
}

impl Plugin {
    /// Creates a plugin with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source loader for `type_name`.
    pub fn with_source(mut self, type_name: impl Into<String>, loader: SourceLoader) -> Self {
        self.source_handlers
            .get_or_insert_with(HashMap::new)
            .insert(type_name.into(), loader);
        self
    }

    /// Registers a sink loader for `type_name`.
    pub fn with_sink(mut self, type_name: impl Into<String>, loader: SinkLoader) -> Self {
        self.sink_handlers
            .get_or_insert_with(HashMap::new)
            .insert(type_name.into(), loader);
        self
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn keys<V>(map: &Option<HashMap<String, V>>) -> Vec<String> {
            let mut keys: Vec<String> = map.iter().flat_map(|m| m.keys().cloned()).collect();
            keys.sort();
            keys
        }
        f.debug_struct("Plugin")
            .field("source_handlers", &keys(&self.source_handlers))
            .field("sink_handlers", &keys(&self.sink_handlers))
            .finish()
    }
}
