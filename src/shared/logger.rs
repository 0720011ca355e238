use core::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};

use env_logger::fmt::{Color, Style, StyledValue};
use log::Level;

use crate::config::CARGO_PKG_NAME;

/// Width of the widest target printed so far, so columns line up
static TARGET_WIDTH: AtomicUsize = AtomicUsize::new(0);

static SETUP_LOGS: Once = Once::new();

/// Installs the crate logger once. Honors `RUST_LOG`, defaults to `info`.
///
/// Does nothing if the embedding program already installed a logger.
pub fn setup_logger() {
    SETUP_LOGS.call_once(|| {
        if build_logger().is_test(cfg!(test)).try_init().is_err() {
            log::debug!("A logger was already installed, keeping it");
        }
    });
}

fn build_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    builder.format(|f, record| {
        use std::io::Write;

        let target = short_target(record.target());
        let width = target_width(target);

        let mut style = f.style();
        let level = colored_level(&mut style, record.level());

        let mut style = f.style();
        let target = style.set_bold(true).value(Padded {
            value: target,
            width,
        });

        let time = f.timestamp_micros().to_string();
        // "2024-01-01T12:34:56.123456Z" -> "12:34:56.123456Z"
        let time = time.get(11..).unwrap_or(&time);
        writeln!(f, "{time} {level} {target} > {}", record.args())
    });

    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.parse_env("RUST_LOG");

    builder
}

/// Strips the crate name from a log target.
/// `bufmgr::storage::buffer::buffer_pool` becomes `storage::buffer::buffer_pool`.
fn short_target(target: &str) -> &str {
    match target.strip_prefix(CARGO_PKG_NAME) {
        Some("") => CARGO_PKG_NAME,
        Some(rest) => rest.strip_prefix("::").unwrap_or(target),
        None => target,
    }
}

fn target_width(target: &str) -> usize {
    TARGET_WIDTH
        .fetch_max(target.len(), Ordering::Relaxed)
        .max(target.len())
}

struct Padded<T> {
    value: T,
    width: usize,
}

impl<T: fmt::Display> fmt::Display for Padded<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{: <width$}", self.value, width = self.width)
    }
}

fn colored_level<'a>(style: &'a mut Style, level: Level) -> StyledValue<'a, &'static str> {
    match level {
        Level::Trace => style.set_color(Color::Magenta).value("TRACE"),
        Level::Debug => style.set_color(Color::Blue).value("DEBUG"),
        Level::Info => style.set_color(Color::Green).value("INFO "),
        Level::Warn => style.set_color(Color::Yellow).value("WARN "),
        Level::Error => style.set_color(Color::Red).value("ERROR"),
    }
}
