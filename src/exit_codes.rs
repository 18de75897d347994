//! Exit code constants for the conductor CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable task file)
//! - 2: Agent failure (a dispatched agent failed, or the pipeline failed)
//! - 3: Configuration error

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid input files.
pub const USER_ERROR: i32 = 1;

/// At least one agent result was a failure.
pub const AGENT_FAILURE: i32 = 2;

/// Configuration file could not be read, parsed, or validated.
pub const CONFIG_ERROR: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, AGENT_FAILURE, CONFIG_ERROR];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
