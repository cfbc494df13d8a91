// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use regmerge_recon::Metrics;

use crate::{ensure_parent, IoError};

/// Write metrics as pretty-printed JSON, fields in declaration order.
pub fn write_metrics_json(path: &Path, metrics: &Metrics) -> Result<(), IoError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, metrics).map_err(|e| IoError::write(path, e))?;
    writer.write_all(b"\n").map_err(|e| IoError::write(path, e))?;
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
