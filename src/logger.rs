// Leveled stderr logger: ERROR/WARN/INFO/DEBUG.
// The level lives in one atomic set from the CLI flags, so every module can
// log without threading a handle through the pipeline.

use chrono::Local;
use std::sync::atomic::{AtomicU8, Ordering};

// Levels are ordered so a simple >= check decides visibility.
const ERROR_LEVEL: u8 = 0;
const WARN_LEVEL: u8 = 1;
const INFO_LEVEL: u8 = 2;
const DEBUG_LEVEL: u8 = 3;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(INFO_LEVEL);

// --debug wins over --quiet when both are given.
pub fn configure(debug: bool, quiet: bool) {
    let level = if debug {
        DEBUG_LEVEL
    } else if quiet {
        WARN_LEVEL
    } else {
        INFO_LEVEL
    };
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

pub fn is_debug() -> bool {
    enabled(DEBUG_LEVEL)
}

pub fn is_quiet() -> bool {
    !enabled(INFO_LEVEL)
}

pub fn error(msg: &str) {
    log_line(ERROR_LEVEL, "ERROR", msg);
}

pub fn warn(msg: &str) {
    log_line(WARN_LEVEL, "WARN", msg);
}

pub fn info(msg: &str) {
    log_line(INFO_LEVEL, "INFO", msg);
}

pub fn debug(msg: &str) {
    log_line(DEBUG_LEVEL, "DEBUG", msg);
}

fn enabled(level: u8) -> bool {
    LOG_LEVEL.load(Ordering::Relaxed) >= level
}

fn log_line(level: u8, label: &str, msg: &str) {
    if !enabled(level) {
        return;
    }
    let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
    eprintln!("[{}] {} {}", label, ts, msg);
}
