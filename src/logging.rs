/// Structured logging for the flow engine
///
/// Provides context-rich logging with structure identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for long-running callers.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::FlowError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Weir,
    Sluice,
    Interpolator,
    Calculator,
    Config,
    Registry,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Weir => write!(f, "BCW"),
            Component::Sluice => write!(f, "SG"),
            Component::Interpolator => write!(f, "INTERP"),
            Component::Calculator => write!(f, "CALC"),
            Component::Config => write!(f, "CFG"),
            Component::Registry => write!(f, "REG"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected outcome - query point lies outside the generated table domain
    Expected,
    /// Unexpected failure - indicates bad structure data or configuration
    Unexpected,
    /// Unknown - input may be a sensor fault or a genuinely dry structure
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut guard) = LOGGER.lock() {
            *guard = Some(logger);
        }
    }

    fn format_entry(
        level: LogLevel,
        component: Component,
        structure_id: Option<&str>,
        message: &str,
    ) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let structure_part = structure_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!(
            "{} {} {}{}: {}",
            timestamp, level, component, structure_part, message
        )
    }

    fn log(&self, level: LogLevel, component: Component, structure_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, structure_id, message);
        let structure_part = structure_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, structure_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, structure_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, structure_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, structure_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, structure_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, structure_id, message);
}

/// Log a warning message
pub fn warn(component: Component, structure_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, structure_id, message);
}

/// Log an error message
pub fn error(component: Component, structure_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, structure_id, message);
}

/// Log a debug message
pub fn debug(component: Component, structure_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, structure_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a flow calculation failure
pub fn classify_flow_failure(err: &FlowError) -> FailureType {
    match err {
        // Query point near corr ≈ go, normal at low heads with wide openings
        FlowError::NoInterpolationData { .. } => FailureType::Expected,
        // Registry carries a type nobody modelled
        FlowError::UnsupportedStructureType(_) => FailureType::Unexpected,
        FlowError::OutOfDomain { .. } => FailureType::Unknown,
    }
}

/// Log a flow calculation failure with automatic classification
pub fn log_flow_failure(structure_id: Option<&str>, operation: &str, err: &FlowError) {
    let failure_type = classify_flow_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Calculator, structure_id, &message),
        FailureType::Unexpected => error(Component::Calculator, structure_id, &message),
        FailureType::Unknown => warn(Component::Calculator, structure_id, &message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let no_data = FlowError::NoInterpolationData {
            level: 2.0,
            gate_opening: 40.0,
        };
        assert_eq!(classify_flow_failure(&no_data), FailureType::Expected);

        let unsupported = FlowError::UnsupportedStructureType("TW".to_string());
        assert_eq!(classify_flow_failure(&unsupported), FailureType::Unexpected);

        let dry = FlowError::out_of_domain("weir head must be positive");
        assert_eq!(classify_flow_failure(&dry), FailureType::Unknown);
    }

    #[test]
    fn test_entry_carries_component_and_structure() {
        let entry = Logger::format_entry(LogLevel::Warning, Component::Sluice, Some("12"), "gate jammed");
        assert!(entry.ends_with("WARN SG [12]: gate jammed"), "got {}", entry);
    }

    #[test]
    fn test_file_sink_appends_entries() {
        let path = std::env::temp_dir().join(format!("wlmsys_flow_log_{}.log", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);
        Logger::append_to_file(&path_str, "first").expect("temp dir is writable");
        Logger::append_to_file(&path_str, "second").expect("temp dir is writable");
        let contents = std::fs::read_to_string(&path).expect("log file exists");
        assert_eq!(contents, "first\nsecond\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_initialized_logger_writes_to_file() {
        let path = std::env::temp_dir().join(format!("wlmsys_flow_global_{}.log", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);

        init_logger(LogLevel::Warning, Some(&path_str), false);
        debug(Component::Interpolator, None, "below threshold");
        warn(Component::Sluice, Some("12"), "gate position sensor offline");

        let contents = std::fs::read_to_string(&path).expect("warning reached the file");
        assert!(contents.contains("WARN SG [12]: gate position sensor offline"), "got {}", contents);
        assert!(!contents.contains("below threshold"));
        let _ = std::fs::remove_file(&path);
    }
}
