// Tool collaborator
pub const TOOL_FAILED: &str = "TOOL_FAILED";
pub const TOOL_TIMEOUT: &str = "TOOL_TIMEOUT";
pub const MALFORMED_TOOL_OUTPUT: &str = "MALFORMED_TOOL_OUTPUT";

// Producers
pub const MANDATORY_CONTENT: &str = "MANDATORY_CONTENT";
pub const MISSING_CAPABILITY: &str = "MISSING_CAPABILITY";
pub const TRANSFORM_FAILED: &str = "TRANSFORM_FAILED";

// Bundle finalization
pub const INVALID_REWRITE_PATTERN: &str = "INVALID_REWRITE_PATTERN";
pub const UNKNOWN_FILE_REF: &str = "UNKNOWN_FILE_REF";

// Configuration
pub const INVALID_OPTION: &str = "INVALID_OPTION";

pub const IO_ERROR: &str = "IO_ERROR";
pub const PANIC: &str = "PANIC";
