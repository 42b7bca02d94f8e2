/// cli/src/output.rs
/// Output utilities for the javelin driver
/// description: console-styled logging, the compile progress bar and the
/// goal status table printed by `--report`.

use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use javelin_core::scheduler::{GoalReport, GoalStatus};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// ====================================================================
/// Styles

/// Styles for the different kinds of driver output.
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub debug: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            debug: Style::new().dim(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Error => &self.error,
            Level::Warn => &self.warning,
            Level::Info => &self.info,
            Level::Debug | Level::Trace => &self.debug,
        }
    }
}

/// ====================================================================
/// Logging

/// Map the number of `-v` flags to a log level. Warnings and errors are
/// always shown.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Writes log records to stderr, one styled line per record.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let styles = FormatStyle::default();
        let tag = styles.for_level(record.level()).apply_to(format!("{:<5}", record.level()));
        let _ = writeln!(io::stderr(), "{} {}: {}", tag, record.target(), record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Install the console logger. Calling this twice keeps the first logger
/// and only updates the level.
pub fn init_logging(verbose: u8) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_for_verbosity(verbose));
}

/// ====================================================================
/// Progress

/// Progress bar over compilation units. Hidden when stderr is not a
/// terminal so piped output stays clean.
pub fn unit_progress(total: usize) -> ProgressBar {
    if !Term::stderr().is_term() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    match ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        Ok(style) => bar.set_style(style.progress_chars("█▒░")),
        Err(err) => log::debug!("progress template rejected: {}", err),
    }
    bar
}

/// ====================================================================
/// Reports

fn status_cell(status: GoalStatus) -> Cell {
    let color = match status {
        GoalStatus::Succeeded => Color::Green,
        GoalStatus::Failed => Color::Red,
        GoalStatus::Running => Color::Yellow,
        GoalStatus::Pending => Color::Grey,
    };
    Cell::new(status).fg(color)
}

/// Render one row per goal: job, goal kind, pass, status and attempts.
pub fn goal_table(reports: &[GoalReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["job", "goal", "pass", "status", "attempts"]);
    for report in reports {
        table.add_row(vec![
            Cell::new(report.key.job),
            Cell::new(&report.key.kind),
            Cell::new(&report.pass),
            status_cell(report.status),
            Cell::new(report.attempts),
        ]);
    }
    table
}

/// Final one-line summary, styled by outcome.
pub fn summary(compiled: usize, total: usize) -> String {
    let styles = FormatStyle::default();
    let text = format!("compiled {} of {} unit(s)", compiled, total);
    if compiled == total {
        styles.success.apply_to(text).to_string()
    } else {
        styles.error.apply_to(text).to_string()
    }
}

pub fn title(text: &str) -> String {
    FormatStyle::default().title.apply_to(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin_core::scheduler::{GoalKey, GoalKind};
    use javelin_core::JobId;

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Info);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn table_lists_every_goal() {
        let reports = vec![
            GoalReport {
                key: GoalKey::new(JobId(0), GoalKind::Parsed),
                pass: "parse".to_string(),
                status: GoalStatus::Succeeded,
                attempts: 1,
            },
            GoalReport {
                key: GoalKey::new(JobId(0), GoalKind::TypeChecked),
                pass: "type-check".to_string(),
                status: GoalStatus::Failed,
                attempts: 2,
            },
        ];
        let rendered = goal_table(&reports).to_string();
        assert!(rendered.contains("TypeChecked"));
        assert!(rendered.contains("type-check"));
        assert!(rendered.contains("failed"));
    }

    #[test]
    fn summary_mentions_counts() {
        let text = console::strip_ansi_codes(&summary(1, 2)).to_string();
        assert_eq!(text, "compiled 1 of 2 unit(s)");
    }
}
