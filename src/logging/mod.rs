//! Console logging for applications built on this crate.
//!
//! The library itself only talks to the `log` facade. Binaries call [setup]
//! once at startup to see the output.

mod pretty_list;

use std::{fmt::Write as FmtWrite, io, sync::OnceLock};

use anyhow::Result;
use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};
use regex::Regex;
use textwrap::{termwidth, Options};

pub use self::pretty_list::PrettyList;

/// Matches the final continuation marker of a wrapped log entry.
static LAST_LINE_MARKER: OnceLock<Regex> = OnceLock::new();

/// Setup console logging for this application.
///
/// The level is read from RUST_LOG and defaults to info. Keep the returned
/// handle alive for as long as logs should be written.
pub fn setup() -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str("info")?
        .format(multiline_format)
        .start()?;

    log::info!(
        "Adjust the log level by setting RUST_LOG. By default RUST_LOG=info"
    );

    Ok(handle)
}

/// A multiline log format for flexi_logger.
///
/// Entries are wrapped at terminal width and framed with box-drawing
/// characters so it's easy to tell where a big log statement begins and ends.
pub fn multiline_format(
    w: &mut dyn io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), io::Error> {
    let size = termwidth().min(74);
    let wrap_options = Options::new(size)
        .initial_indent("┏ ")
        .subsequent_indent("┃ ");

    let mut full_line = String::new();
    writeln!(
        full_line,
        "{} [{}] [{}:{}]",
        record.level(),
        now.now().format("%H:%M:%S%.6f"),
        record.file().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
    )
    .map_err(io::Error::other)?;
    write!(full_line, "{}", record.args()).map_err(io::Error::other)?;

    writeln!(w, "{}", close_entry(&textwrap::fill(&full_line, wrap_options)))
}

/// Swap the continuation marker on the last line for a closing marker.
fn close_entry(wrapped: &str) -> String {
    let marker = LAST_LINE_MARKER.get_or_init(|| {
        Regex::new(r"(┃)(.*)$").expect("constant pattern compiles")
    });
    marker.replace(wrapped, "┗$2").into_owned()
}
