//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | Resource error (template or storage unreadable/unwritable) |
//! | 2    | Usage or validation error (bad args, malformed submission) |
//! | 3    | Conflict (duplicate sheet, missing workbook, unconfirmed replace) |
//! | 4    | Report file not found                                      |

use labsheet_engine::ErrorKind;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Template or storage failure.
pub const EXIT_RESOURCE: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid submission.
pub const EXIT_USAGE: u8 = 2;

/// Submission rejected against the current state of the monthly file.
pub const EXIT_CONFLICT: u8 = 3;

/// Requested report does not exist under the output directory.
pub const EXIT_NOT_FOUND: u8 = 4;

pub fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => EXIT_USAGE,
        ErrorKind::Conflict => EXIT_CONFLICT,
        ErrorKind::Resource => EXIT_RESOURCE,
        ErrorKind::NotFound => EXIT_NOT_FOUND,
    }
}
