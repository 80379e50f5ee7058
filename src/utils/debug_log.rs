use crate::error::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Печатает путь к debug-логу и его содержимое.
pub fn print_debug_log(path: &Path, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Debug log: {}", path.display())?;

    match fs::read(path) {
        Ok(contents) => {
            writeln!(out, "----- begin debug log -----")?;
            out.write_all(&contents)?;
            if !contents.ends_with(b"\n") && !contents.is_empty() {
                writeln!(out)?;
            }
            writeln!(out, "----- end debug log -----")?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            writeln!(out, "Файл ещё не создан. Запустите с --debug или debug=true в файле меток.")?;
        }
        Err(e) => return Err(e.into()),
    }

    out.flush()?;
    Ok(())
}
