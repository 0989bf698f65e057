//! Top-level orchestration of a conversion run.

use tracing::info;

use crate::{
    AlchemyError, Configuration, Plugin, read_problems, resolve_handler_loaders,
    resolve_handlers, write_problems,
};

/// Converts every configured source into every configured sink.
///
/// Steps run strictly in sequence: all source and sink types are checked,
/// then their handlers are loaded, then all sources are read and handed
/// to their handlers, then all sinks are written. `plugins` is ordered by
/// priority, lowest first.
pub async fn run_report_alchemy(
    config: &Configuration,
    plugins: &[Plugin],
) -> Result<usize, AlchemyError> {
    // No handlers are loaded until all of the types are checked.
    let source_loaders = resolve_handler_loaders(
        &config.sources,
        plugins,
        |plugin| plugin.source_handlers.as_ref(),
        "Unknown source type: ",
    )?;
    let sink_loaders = resolve_handler_loaders(
        &config.sinks,
        plugins,
        |plugin| plugin.sink_handlers.as_ref(),
        "Unknown sink type: ",
    )?;

    let source_handlers = resolve_handlers(&source_loaders).await?;
    let sink_handlers = resolve_handlers(&sink_loaders).await?;

    // Every source is validated here, before any sink file is opened.
    let problems = read_problems(&config.sources, &source_handlers).await?;

    let count = write_problems(&config.sinks, &sink_handlers, problems).await?;
    info!(
        "Converted {} problem(s) from {} source(s) into {} sink(s)",
        count,
        config.sources.len(),
        config.sinks.len()
    );

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HandlerOptions, Position, Problem, ProblemIter, ReportSink, ReportSource, SinkHandler,
        SinkInput, SinkLoader, SinkWriter, SourceHandler, SourceLoader, loader,
    };
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Emits one problem per line, rejecting empty buffers.
    struct Lines;

    impl SourceHandler for Lines {
        fn read(&self, buffer: Vec<u8>, _: &HandlerOptions) -> Result<ProblemIter, AlchemyError> {
            if buffer.is_empty() {
                return Err(AlchemyError::invalid_source("empty report"));
            }
            let text = String::from_utf8_lossy(&buffer).into_owned();
            let problems: Vec<_> = text
                .lines()
                .map(|line| Ok(Problem::new("f", line, Position::default())))
                .collect();
            Ok(Box::new(problems.into_iter()))
        }
    }

    /// Writes `[message]` per problem and `.` at the end.
    struct Plain;

    struct PlainWriter(Box<dyn Write + Send>);

    impl SinkWriter for PlainWriter {
        fn accept(&mut self, input: SinkInput<'_>) -> Result<(), AlchemyError> {
            match input {
                SinkInput::Problem(problem) => write!(self.0, "[{}]", problem.message)?,
                SinkInput::End => {
                    write!(self.0, ".")?;
                    self.0.flush()?;
                }
            }
            Ok(())
        }
    }

    impl SinkHandler for Plain {
        fn open(
            &self,
            destination: Box<dyn Write + Send>,
            _: &HandlerOptions,
        ) -> Result<Box<dyn SinkWriter>, AlchemyError> {
            Ok(Box::new(PlainWriter(destination)))
        }
    }

    fn spy_source(calls: Arc<AtomicUsize>) -> SourceLoader {
        loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Arc::new(Lines) as Arc<dyn SourceHandler>) }
        })
    }

    fn spy_sink(calls: Arc<AtomicUsize>) -> SinkLoader {
        loader(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Arc::new(Plain) as Arc<dyn SinkHandler>) }
        })
    }

    #[tokio::test]
    async fn test_run_converts_sources_into_sinks() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "a\nb\n").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let plugins = vec![
            Plugin::new()
                .with_source("lines", spy_source(calls.clone()))
                .with_sink("plain", spy_sink(calls.clone())),
        ];
        let config = Configuration {
            sources: vec![ReportSource::new("lines", input.to_str().unwrap())],
            sinks: vec![ReportSink::new("plain", output.to_str().unwrap())],
            ..Default::default()
        };

        let count = run_report_alchemy(&config, &plugins).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[a][b].");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_sink_type_loads_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.txt");

        let calls = Arc::new(AtomicUsize::new(0));
        let plugins = vec![
            Plugin::new()
                .with_source("lines", spy_source(calls.clone()))
                .with_sink("plain", spy_sink(calls.clone())),
        ];
        let config = Configuration {
            sources: vec![ReportSource::new("lines", "does-not-matter.txt")],
            sinks: vec![ReportSink::new("html", output.to_str().unwrap())],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &plugins).await.unwrap_err();

        assert_eq!(err.to_string(), "Unknown sink type: html");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_invalid_leading_source_fails_before_sinks_open() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "").unwrap();

        let plugins = vec![
            Plugin::new()
                .with_source("lines", spy_source(Arc::default()))
                .with_sink("plain", spy_sink(Arc::default())),
        ];
        let config = Configuration {
            sources: vec![ReportSource::new("lines", input.to_str().unwrap())],
            sinks: vec![ReportSink::new("plain", output.to_str().unwrap())],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &plugins).await.unwrap_err();

        assert!(matches!(err, AlchemyError::InvalidSourceData(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_invalid_later_source_leaves_existing_sink_untouched() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&good, "a\n").unwrap();
        std::fs::write(&bad, "").unwrap();
        std::fs::write(&output, "PREVIOUS OUTPUT").unwrap();

        let plugins = vec![
            Plugin::new()
                .with_source("lines", spy_source(Arc::default()))
                .with_sink("plain", spy_sink(Arc::default())),
        ];
        let config = Configuration {
            sources: vec![
                ReportSource::new("lines", good.to_str().unwrap()),
                ReportSource::new("lines", bad.to_str().unwrap()),
            ],
            sinks: vec![ReportSink::new("plain", output.to_str().unwrap())],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &plugins).await.unwrap_err();

        assert!(matches!(err, AlchemyError::InvalidSourceData(_)));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "PREVIOUS OUTPUT");
    }

    #[tokio::test]
    async fn test_missing_source_file_is_not_found() {
        let dir = tempdir().unwrap();
        let plugins = vec![
            Plugin::new()
                .with_source("lines", spy_source(Arc::default()))
                .with_sink("plain", spy_sink(Arc::default())),
        ];
        let config = Configuration {
            sources: vec![ReportSource::new(
                "lines",
                dir.path().join("missing.txt").to_str().unwrap(),
            )],
            sinks: vec![],
            ..Default::default()
        };

        let err = run_report_alchemy(&config, &plugins).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
