//! Shared plumbing for the command line tools

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::Level;

/// `-v` / `-q` flags shared by every tool
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct Verbosity {
    /// Print verbose information for debugging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress warnings
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Verbosity {
    /// Warnings by default, each `-v` raises and each `-q` lowers the level
    pub fn level(&self) -> Level {
        const LEVELS: [Level; 4] = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG];
        let idx = (1 + self.verbose as i32 - self.quiet as i32).clamp(0, 3);
        LEVELS[idx as usize]
    }
}

/// Initialize logging to stderr.
///
/// The level comes from the verbosity flags; `RUST_LOG` directives can
/// still refine it per module.
pub fn init_logging(verbosity: &Verbosity) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(verbosity.level()).into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Read an input document
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Error reading input file '{}'", path.display()))
}

/// Write converted output to `output`, or stdout when it is `None`.
///
/// File output goes to a temporary file beside the target, takes the input
/// file's permissions and is moved into place only once fully written.
pub fn write_output<F>(input: &Path, output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let Some(output) = output else {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write(&mut out).context("Error writing to stdout")?;
        out.flush().context("Error writing to stdout")?;
        return Ok(());
    };

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Error creating temporary file in '{}'", dir.display()))?;

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out)
            .and_then(|_| out.flush())
            .with_context(|| format!("Error writing output file '{}'", output.display()))?;
    }

    if let Ok(meta) = fs::metadata(input) {
        fs::set_permissions(tmp.path(), meta.permissions())
            .with_context(|| format!("Error setting permissions on '{}'", output.display()))?;
    }

    tmp.persist(output)
        .with_context(|| format!("Error writing output file '{}'", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let level = |verbose, quiet| Verbosity { verbose, quiet }.level();
        assert_eq!(level(0, 0), Level::WARN);
        assert_eq!(level(1, 0), Level::INFO);
        assert_eq!(level(5, 0), Level::DEBUG);
        assert_eq!(level(0, 1), Level::ERROR);
        assert_eq!(level(0, 4), Level::ERROR);
        assert_eq!(level(2, 1), Level::INFO);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.svg");
        fs::write(&input, "<svg/>").unwrap();
        let output = dir.path().join("out.obj");

        write_output(&input, Some(&output), |out| out.write_all(b"g\n")).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "g\n");
    }

    #[test]
    fn test_failed_write_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.svg");
        fs::write(&input, "<svg/>").unwrap();
        let output = dir.path().join("out.obj");

        let result = write_output(&input, Some(&output), |_| {
            Err(io::Error::other("conversion failed"))
        });

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
