//! Process exit codes of the `pm-core` binary.
//!
//! `0` is success, `10..=19` means the caller must change something (the
//! arguments, the request, the config file), and `20` and up are failures on
//! this side or in the environment. Automation depends on these numbers.

use pm_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Clean = 0,
    /// Bad arguments, out-of-range parameters, conflicting options.
    ArgsError = 10,
    /// The raw record or request document was rejected.
    InputError = 11,
    ConfigError = 12,
    /// Computation failed on a log that passed validation.
    InternalError = 20,
    IoError = 21,
    TimeoutError = 22,
    DeliveryError = 23,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 10 through 19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 20
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        use pm_common::ErrorCategory;
        match (err.category(), err) {
            (_, Error::Json(_)) => ExitCode::InputError,
            (_, Error::Io(_)) => ExitCode::IoError,
            (_, Error::DeliveryTimeout { .. }) => ExitCode::TimeoutError,
            (_, Error::ConfigurationConflict(_)) | (_, Error::InvalidArgument(_)) => {
                ExitCode::ArgsError
            }
            (ErrorCategory::Config, _) | (_, Error::Yaml(_)) => ExitCode::ConfigError,
            (ErrorCategory::Input, _) => ExitCode::InputError,
            (ErrorCategory::Delivery, _) => ExitCode::DeliveryError,
            (ErrorCategory::Computation, _) | (ErrorCategory::Io, _) => ExitCode::InternalError,
        }
    }
}
