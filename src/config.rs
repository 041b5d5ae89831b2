// ABOUTME: Configuration and constants for the TGTL interpreter
// This module contains version info, welcome messages, and scope-depth limits.

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "TGTL v0.1.0";
pub const WELCOME_SUBTITLE: &str = "A small command-oriented scripting language";

/// Maximum number of scope frames on the call stack at once. Exceeding this
/// outside of an active rescue is a hard failure, not a silent overflow.
pub const FRAMES_MAX: usize = 80;

/// Default REPL history file, relative to the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".tgtl_history";
