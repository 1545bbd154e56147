//! Logging bootstrap shared by every crate in the workspace.
//!
//! The library code in `btcspv_core`/`btcspv_p2p` only ever calls the `log`
//! facade macros (`trace!`, `debug!`, ...); it never touches this module.
//! A host binary calls [`init_logger`] once at startup, and tests call
//! [`init_test_logger`].

use std::ops::Deref;
use std::{panic, thread};

use backtrace::Backtrace;
use log::{LevelFilter, Record};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::append::rolling_file::{
	policy::compound::roll::fixed_window::FixedWindowRoller,
	policy::compound::trigger::size::SizeTrigger, policy::compound::CompoundPolicy,
	RollingFileAppender,
};
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::{threshold::ThresholdFilter, Filter, Response};
use parking_lot::Mutex;

use crate::types::{LogLevel, LoggingConfig};

fn convert_log_level(level: &LogLevel) -> LevelFilter {
	match *level {
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
		LogLevel::Error => LevelFilter::Error,
	}
}

lazy_static::lazy_static! {
	/// Whether logging was explicitly initialised (avoids double init in tests).
	static ref WAS_INIT: Mutex<bool> = Mutex::new(false);
}

const LOGGING_PATTERN: &str = "{d(%Y%m%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

/// Rejects records that don't originate from this workspace, so embedding a
/// dependency graph full of chatty crates doesn't drown out our own logs.
#[derive(Debug)]
struct BtcSpvFilter;

impl Filter for BtcSpvFilter {
	fn filter(&self, record: &Record<'_>) -> Response {
		match record.module_path() {
			Some(path) if path.starts_with("btcspv") => Response::Neutral,
			_ => Response::Reject,
		}
	}
}

/// Initializes process-wide logging from the given configuration.
///
/// Calling this more than once is harmless; subsequent calls are ignored
/// (log4rs only allows a single global logger to be installed).
pub fn init_logger(config: Option<LoggingConfig>) {
	if let Some(c) = config {
		let level_stdout = convert_log_level(&c.stdout_log_level);
		let level_file = convert_log_level(&c.file_log_level);
		let level_minimum = level_stdout.max(level_file);

		let mut root = Root::builder();
		let mut appenders = vec![];

		if c.log_to_stdout {
			let stdout = ConsoleAppender::builder()
				.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
				.build();
			appenders.push(
				Appender::builder()
					.filter(Box::new(ThresholdFilter::new(level_stdout)))
					.filter(Box::new(BtcSpvFilter))
					.build("stdout", Box::new(stdout)),
			);
			root = root.appender("stdout");
		}

		if c.log_to_file {
			let filter = Box::new(ThresholdFilter::new(level_file));
			let file: Box<dyn Append> = if let Some(size) = c.log_max_size {
				let roller = FixedWindowRoller::builder()
					.build(&format!("{}.{{}}.gz", c.log_file_path), 8)
					.expect("valid rolling file pattern");
				let trigger = SizeTrigger::new(size);
				let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));
				Box::new(
					RollingFileAppender::builder()
						.append(c.log_file_append)
						.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
						.build(&c.log_file_path, Box::new(policy))
						.expect("writable log file path"),
				)
			} else {
				Box::new(
					FileAppender::builder()
						.append(c.log_file_append)
						.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
						.build(&c.log_file_path)
						.expect("writable log file path"),
				)
			};
			appenders.push(Appender::builder().filter(filter).filter(Box::new(BtcSpvFilter)).build("file", file));
			root = root.appender("file");
		}

		let config = Config::builder()
			.appenders(appenders)
			.build(root.build(level_minimum))
			.expect("valid log4rs configuration");

		if log4rs::init_config(config).is_ok() {
			*WAS_INIT.lock() = true;
			log::info!("logger initialized: stdout={:?} file={:?}", level_stdout, level_file);
		}
	}

	send_panic_to_log();
}

/// Initializes a stdout-only, debug-level logger for unit/integration tests.
/// Safe to call from many test functions; only the first call takes effect.
pub fn init_test_logger() {
	let mut was_init = WAS_INIT.lock();
	if *was_init.deref() {
		return;
	}
	let mut config = LoggingConfig::default();
	config.log_to_file = false;
	config.stdout_log_level = LogLevel::Debug;
	*was_init = true;
	drop(was_init);
	init_logger(Some(config));
}

/// Routes panics through `log::error!` (with a backtrace) instead of only
/// stderr, so a panicking peer/parse thread leaves a trace in the log file.
fn send_panic_to_log() {
	panic::set_hook(Box::new(|info| {
		let backtrace = Backtrace::new();
		let thread = thread::current();
		let thread_name = thread.name().unwrap_or("<unnamed>");
		log::error!("thread '{}' panicked: {}\n{:?}", thread_name, info, backtrace);
	}));
}
