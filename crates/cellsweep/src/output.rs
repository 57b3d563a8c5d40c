//! Job output formats
//!
//! `json` writes one JSON object per job and line, for a launcher script to
//! read with `jq` or similar. `shell` writes the commands themselves, quoted
//! for `sh`, with the serial creation step (if any) before the parallel run.

use std::borrow::Cow;
use std::io::{self, Write};

use cellsweep_core::model::JobSpec;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Shell,
}

pub fn write_job(out: &mut impl Write, job: &JobSpec, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, job)?;
            writeln!(out)
        }
        OutputFormat::Shell => {
            writeln!(
                out,
                "# job {} (run {}): {}",
                job.sequence,
                job.run_index,
                job.output_path.display()
            )?;
            if let Some(prepare) = job.prepare_command_line() {
                writeln!(out, "{}", shell_line(&prepare))?;
            }
            writeln!(out, "{}", shell_line(&job.command_line()))
        }
    }
}

/// Join words into one `sh` command line
pub fn shell_line(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| shell_quote(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote `word` for `sh` unless it is made of characters that need none
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=,+@%".contains(c));
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}
