pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, DetectArgs, MaxSatisfyingArgs, ResolveSdkArgs};
pub use output::{DetectionReport, MaxSatisfyingReport, OutputFormat, OutputFormatter, SdkReport};

use crate::error::ErrorKind;

/// Process exit code for a failure of the given kind
pub fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Ambiguous => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Unsupported => 4,
        ErrorKind::MalformedInput => 5,
        ErrorKind::Io => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        assert_eq!(exit_code(ErrorKind::Io), 1);
        assert_eq!(exit_code(ErrorKind::Ambiguous), 2);
        assert_eq!(exit_code(ErrorKind::NotFound), 3);
        assert_eq!(exit_code(ErrorKind::Unsupported), 4);
        assert_eq!(exit_code(ErrorKind::MalformedInput), 5);
    }
}
