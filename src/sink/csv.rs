//! CSV scalar output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

use super::ScalarWriter;

/// Writer that appends `step,name,value` rows to a CSV file
///
/// The header row is written at creation. Rows are buffered; `flush` forces
/// them out, and remaining rows are flushed on drop with failures ignored
/// at that point.
///
/// # Example
///
/// ```no_run
/// use medir::sink::{CsvScalarWriter, ScalarWriter};
///
/// # fn main() -> medir::Result<()> {
/// let mut writer = CsvScalarWriter::create("metrics.csv")?;
/// writer.add_scalar("Train: Batches per second (step granularity)", 0.25, 1)?;
/// writer.flush()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CsvScalarWriter {
    writer: BufWriter<File>,
}

impl CsvScalarWriter {
    /// Create the file, truncating any existing content, and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "step,name,value")?;
        Ok(Self { writer })
    }
}

impl ScalarWriter for CsvScalarWriter {
    fn add_scalar(&mut self, tag: &str, value: f64, step: u64) -> Result<()> {
        writeln!(self.writer, "{step},{tag},{value}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for CsvScalarWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
