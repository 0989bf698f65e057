//! Streaming problems from sources into sinks.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex};

use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::io::{open_for_writing, read_file};
use crate::{
    AlchemyError, FrozenProblem, HandlerMap, HandlerOptions, ProblemIter, ReportEndpoint,
    ReportSink, ReportSource, SinkHandler, SinkInput, SourceHandler, freeze,
};

/// The merged problem sequence of every configured source.
///
/// Every source has already been handed to its handler, so a buffer with
/// the wrong shape fails in [`read_problems`]. Problems themselves are only
/// produced as the stream is iterated, source by source in configured
/// order, and are frozen before being handed out. The stream is
/// forward-only and stops for good after the first error.
pub struct ProblemStream {
    pending: std::vec::IntoIter<ProblemIter>,
    current: Option<ProblemIter>,
}

impl ProblemStream {
    fn new(sources: Vec<ProblemIter>) -> Self {
        Self {
            pending: sources.into_iter(),
            current: None,
        }
    }

    fn halt(&mut self, error: AlchemyError) -> AlchemyError {
        self.pending = Vec::new().into_iter();
        self.current = None;
        error
    }
}

impl Iterator for ProblemStream {
    type Item = Result<FrozenProblem, AlchemyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(problems) = self.current.as_mut() {
                match problems.next() {
                    Some(Ok(problem)) => return Some(Ok(freeze(problem))),
                    Some(Err(e)) => return Some(Err(self.halt(e))),
                    None => self.current = None,
                }
            }

            self.current = Some(self.pending.next()?);
        }
    }
}

fn handler_for<H: Clone>(
    handlers: &HandlerMap<H>,
    endpoint: &impl ReportEndpoint,
    kind: &str,
) -> Result<H, AlchemyError> {
    handlers.get(endpoint.report_type()).cloned().ok_or_else(|| {
        AlchemyError::config(format!("Unknown {} type: {}", kind, endpoint.report_type()))
    })
}

/// Reads every source file into memory and returns the merged problem stream.
///
/// All files are read concurrently, then each buffer is handed to its
/// handler in configured order. A missing file or a buffer its handler
/// rejects fails here, before any sink is touched. Problems are produced
/// lazily as the stream is iterated.
pub async fn read_problems(
    sources: &[ReportSource],
    handlers: &HandlerMap<Arc<dyn SourceHandler>>,
) -> Result<ProblemStream, AlchemyError> {
    let selected = sources
        .iter()
        .map(|source| handler_for(handlers, source, "source"))
        .collect::<Result<Vec<_>, _>>()?;

    let buffers = try_join_all(sources.iter().map(|source| read_file(&source.filename))).await?;

    let options = HandlerOptions::new();
    let mut problems = Vec::with_capacity(sources.len());
    for ((source, handler), buffer) in sources.iter().zip(selected).zip(buffers) {
        debug!("Read {} bytes from {}", buffer.len(), source.filename);
        problems.push(handler.read(buffer, &options)?);
    }

    Ok(ProblemStream::new(problems))
}

/// A buffered sink file shared between its writer and the pipeline, so the
/// pipeline can flush it after the writer has seen the end marker.
#[derive(Clone)]
struct SinkFile(Arc<Mutex<BufWriter<File>>>);

impl SinkFile {
    fn new(file: File) -> Self {
        Self(Arc::new(Mutex::new(BufWriter::new(file))))
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, BufWriter<File>>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("sink file lock poisoned"))
    }
}

impl Write for SinkFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

/// Opens every sink and feeds it each problem, followed by the end marker.
///
/// All sink files are opened concurrently before the first problem is
/// written. Every sink sees every problem in input order, and no sink
/// receives [`SinkInput::End`] until all problems have been delivered.
/// Each sink file is flushed once its writer has accepted the end marker.
/// Returns the number of problems written.
pub async fn write_problems<I>(
    sinks: &[ReportSink],
    handlers: &HandlerMap<Arc<dyn SinkHandler>>,
    problems: I,
) -> Result<usize, AlchemyError>
where
    I: IntoIterator<Item = Result<FrozenProblem, AlchemyError>>,
{
    let selected = sinks
        .iter()
        .map(|sink| handler_for(handlers, sink, "sink"))
        .collect::<Result<Vec<_>, _>>()?;

    let mut files: Vec<SinkFile> =
        try_join_all(sinks.iter().map(|sink| open_for_writing(&sink.filename)))
            .await?
            .into_iter()
            .map(SinkFile::new)
            .collect();

    let options = HandlerOptions::new();
    let mut writers = selected
        .iter()
        .zip(&files)
        .map(|(handler, file)| handler.open(Box::new(file.clone()), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut count = 0;
    for problem in problems {
        let problem = problem?;
        for writer in writers.iter_mut() {
            writer.accept(SinkInput::Problem(&problem))?;
        }
        count += 1;
    }

    let ends = sinks.iter().zip(writers.iter_mut()).zip(files.iter_mut());
    for ((sink, writer), file) in ends {
        writer.accept(SinkInput::End)?;
        file.flush().map_err(|e| AlchemyError::io(&sink.filename, e))?;
        info!("Wrote {} problem(s) to {}", count, sink.filename);
    }

    Ok(count)
}
