//! Logging configuration types, shared by every crate in the workspace.

use serde::{Deserialize, Serialize};

/// Severity levels accepted by [`crate::logger::init_logger`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
	/// Error
	Error,
	/// Warning
	Warning,
	/// Info
	Info,
	/// Debug
	Debug,
	/// Trace
	Trace,
}

/// Logging configuration for a host process embedding this workspace.
///
/// The workspace crates never construct this themselves (a library does not
/// decide how its host logs); it exists so a binary can hand one to
/// [`crate::logger::init_logger`] once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
	/// whether to log to stdout
	pub log_to_stdout: bool,
	/// logging level for stdout
	pub stdout_log_level: LogLevel,
	/// whether to log to file
	pub log_to_file: bool,
	/// log file level
	pub file_log_level: LogLevel,
	/// Log file path
	pub log_file_path: String,
	/// Whether to append to log or replace
	pub log_file_append: bool,
	/// Size of the log in bytes to rotate over (optional)
	pub log_max_size: Option<u64>,
}

impl Default for LoggingConfig {
	fn default() -> LoggingConfig {
		LoggingConfig {
			log_to_stdout: true,
			stdout_log_level: LogLevel::Warning,
			log_to_file: false,
			file_log_level: LogLevel::Info,
			log_file_path: String::from("btcspv.log"),
			log_file_append: true,
			log_max_size: Some(1024 * 1024 * 16),
		}
	}
}
