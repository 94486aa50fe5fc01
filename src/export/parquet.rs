// src/export/parquet.rs

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::pipeline::DatasetOutput;
use crate::table::ResultTable;

/// Write one table to `path` as a single Snappy-compressed row group.
///
/// The file appears under its final name only once fully written.
pub fn write_table(table: &ResultTable, path: &Path) -> Result<()> {
    let batch = table.to_record_batch()?;

    let tmp = path.with_extension("parquet.tmp");
    let file = File::create(&tmp).with_context(|| format!("creating {:?}", &tmp))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", &tmp, path))?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

/// Write every output as `<dir>/<dataset>.parquet`. Marker tables are written too,
/// so the directory always holds one file per registry entry.
#[instrument(level = "info", skip(outputs), fields(dir = %dir.display()))]
pub fn write_outputs(outputs: &[DatasetOutput], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {:?}", dir))?;

    let mut written = Vec::with_capacity(outputs.len());
    for out in outputs {
        let path = dir.join(format!("{}.parquet", out.name));
        write_table(&out.table, &path)
            .with_context(|| format!("exporting dataset {}", out.name))?;
        written.push(path);
    }
    info!(files = written.len(), "exported tables");
    Ok(written)
}
