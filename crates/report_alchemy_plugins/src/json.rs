//! JSON reports: a single array of problem objects.

use std::io::Write;

use report_alchemy_core::{
    AlchemyError, HandlerOptions, Problem, ProblemIter, SinkHandler, SinkInput, SinkWriter,
    SourceHandler,
};

/// Reads a JSON array of problems.
pub struct JsonSource;

impl SourceHandler for JsonSource {
    fn read(&self, buffer: Vec<u8>, _: &HandlerOptions) -> Result<ProblemIter, AlchemyError> {
        let problems: Vec<Problem> = serde_json::from_slice(&buffer)
            .map_err(|e| AlchemyError::invalid_source(format!("Malformed JSON report: {}", e)))?;
        Ok(Box::new(problems.into_iter().map(Ok)))
    }
}

/// Writes problems as a JSON array, one problem per line.
pub struct JsonSink;

impl SinkHandler for JsonSink {
    fn open(
        &self,
        mut destination: Box<dyn Write + Send>,
        _: &HandlerOptions,
    ) -> Result<Box<dyn SinkWriter>, AlchemyError> {
        destination.write_all(b"[")?;
        Ok(Box::new(JsonWriter {
            destination,
            written: 0,
        }))
    }
}

struct JsonWriter {
    destination: Box<dyn Write + Send>,
    written: usize,
}

impl SinkWriter for JsonWriter {
    fn accept(&mut self, input: SinkInput<'_>) -> Result<(), AlchemyError> {
        match input {
            SinkInput::Problem(problem) => {
                let separator: &[u8] = if self.written == 0 { b"\n" } else { b",\n" };
                self.destination.write_all(separator)?;
                serde_json::to_writer(&mut self.destination, problem)?;
                self.written += 1;
            }
            SinkInput::End => {
                self.destination.write_all(b"\n]\n")?;
                self.destination.flush()?;
            }
        }
        Ok(())
    }
}
