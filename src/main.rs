//! Command processor for the reldb table engine.
//!
//! ```bash
//! # Interactive prompt
//! reldb --data-dir ./data
//!
//! # Run a script of commands
//! reldb --script queries.txt
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reldb::{Outcome, Session, SessionConfig};

const PROMPT: &str = "reldb> ";

/// Relational table engine driven by a small command language
#[derive(Parser, Debug)]
#[command(name = "reldb", version)]
struct Args {
    /// Run the commands in FILE instead of reading stdin
    #[arg(short = 's', long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Directory relative load/save file names resolve against
    #[arg(short = 'd', long, default_value = ".", env = "RELDB_DATA_DIR")]
    data_dir: PathBuf,

    /// Store assignment results even when they have no rows
    #[arg(long, env = "RELDB_KEEP_EMPTY")]
    keep_empty: bool,

    /// Suppress the prompt
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut session = Session::new(SessionConfig {
        data_dir: args.data_dir,
        keep_empty_results: args.keep_empty,
    });

    match &args.script {
        Some(path) => {
            info!(script = %path.display(), "running script");
            let file = File::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            process(&mut session, BufReader::new(file), &mut io::stdout(), false)
        }
        None => process(&mut session, io::stdin().lock(), &mut io::stdout(), !args.quiet),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("RELDB_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("reldb=debug")
        } else {
            EnvFilter::new("reldb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Feeds every line of `input` to the session until `exit` or end of input,
/// writing results to `out`.
///
/// A failing command is reported and the loop moves on. Bytes that are not
/// valid UTF-8 are replaced rather than ending the session.
fn process<R: BufRead, W: Write>(
    session: &mut Session,
    mut input: R,
    out: &mut W,
    prompt: bool,
) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        if prompt {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match session.execute(line) {
            Ok(Outcome::Message(text)) => writeln!(out, "{}", text.trim_end())?,
            Ok(Outcome::Exit) => break,
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &[u8]) -> String {
        let mut session = Session::default();
        let mut out = Vec::new();
        process(&mut session, script, &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_script_output() {
        let out = run_script(b"# setup\n\ndefine t (int)\nprint t\nexit\nprint t\n");
        assert_eq!(out, "t is now defined.\n\n");
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let out = run_script(b"print nope\nx = rows(\ndefine t (int)\n");
        assert_eq!(out, "t is now defined.\n");
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let out = run_script(b"define a (int)\n\xff\xfe junk\ndefine b (string)\n");
        assert_eq!(out, "a is now defined.\nb is now defined.\n");
    }

    #[test]
    fn test_prompt() {
        let mut session = Session::default();
        let mut out = Vec::new();
        process(&mut session, &b"exit\n"[..], &mut out, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), PROMPT);
    }
}
