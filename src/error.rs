#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

/// Exit code for fit non-convergence.
///
/// Unlike input/data errors, a failed fit is reported and the plot is skipped;
/// the run itself still succeeds.
pub const FIT_FAILURE_CODE: u8 = 4;

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Whether this error is a fit non-convergence (recoverable: the caller
    /// prints the message and skips the affected plot).
    pub fn is_fit_failure(&self) -> bool {
        self.exit_code == FIT_FAILURE_CODE
    }

    /// Prepend context to the message, keeping the exit code.
    pub fn prefixed(self, context: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
