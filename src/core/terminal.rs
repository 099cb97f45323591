//! Human-facing console output of the `clawboard` binary. Structured events
//! go through `tracing`; this only frames startup and fatal errors.

use console::{Emoji, style};
use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::config::DashboardConfig;

static CLAW: Emoji<'_, '_> = Emoji("🦞 ", "");
static UP: Emoji<'_, '_> = Emoji("🟢 ", "* ");
static CAUTION: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
static FAILED: Emoji<'_, '_> = Emoji("❌ ", "x ");

pub fn print_banner() {
    println!();
    println!("{}", banner());
    println!();
}

/// Bind URL, CLI command and file locations. Adds the exposure warning when
/// the host is reachable beyond loopback.
pub fn print_startup(config: &DashboardConfig) {
    for line in startup_lines(config) {
        println!("{line}");
    }
}

pub fn print_log_file_fallback(path: &Path, error: &io::Error) {
    println!(
        "{}",
        caution(format!(
            "Could not open log file {} ({error}); logging to stdout only.",
            path.display()
        ))
    );
}

pub fn print_fatal(error: &anyhow::Error) {
    eprintln!("{FAILED}{}", style(format!("{error:#}")).red().bold());
}

fn banner() -> String {
    format!(
        "{CLAW}{} {}\n{}",
        style("clawboard").bold().magenta(),
        style(env!("CARGO_PKG_VERSION")).dim(),
        style("Dashboard API for the OpenClaw gateway").dim()
    )
}

fn startup_lines(config: &DashboardConfig) -> Vec<String> {
    let url = format!("http://{}", config.bind_addr());
    let mut lines = vec![
        format!("{UP}{}", style("Dashboard API is up").green()),
        field("URL", style(url).underlined().cyan()),
        field("CLI", &config.cli_program),
        field("Static root", config.static_root.display()),
        field("Log file", config.log_file.display()),
    ];
    if config.is_network_exposed() {
        lines.push(caution(format!(
            "Listening on {} exposes the dashboard API beyond this machine. There is no authentication.",
            config.host
        )));
    }
    lines
}

fn field(label: &str, value: impl Display) -> String {
    format!("  {} {value}", style(format!("{label}:")).bold().cyan())
}

fn caution(msg: impl Display) -> String {
    format!("{CAUTION}{}", style(msg).yellow())
}
