use crate::error::{NmdError, Result};
use crate::introns::IntronRegistry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write the intron table to `path`. Returns the number of data rows.
pub fn write_report(registry: &IntronRegistry, path: &Path, skip_unmeasured: bool) -> Result<usize> {
    let io_err = |source| NmdError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let rows = write_table(registry, &mut writer, skip_unmeasured).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(rows)
}

/// Tab-separated table: `INTRON DIRECTION GENE NMD <sample>...`.
pub fn write_table<W: Write>(registry: &IntronRegistry, writer: &mut W, skip_unmeasured: bool) -> io::Result<usize> {
    write!(writer, "INTRON\tDIRECTION\tGENE\tNMD")?;
    for sample in registry.samples() {
        write!(writer, "\t{sample}")?;
    }
    writeln!(writer)?;

    let mut rows = 0usize;
    for (key, intron) in registry.iter() {
        if skip_unmeasured && intron.is_unmeasured() {
            continue;
        }
        let nmd = if intron.nmd { "True" } else { "False" };
        write!(writer, "{key}\t{}\t{}\t{nmd}", intron.strand, intron.gene)?;
        for count in &intron.counts {
            write!(writer, "\t{count}")?;
        }
        writeln!(writer)?;
        rows += 1;
    }
    Ok(rows)
}
