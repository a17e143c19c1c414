use std::fmt;

use ld2410_client::ClientError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
#[allow(dead_code)]
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    let code = match &err {
        ClientError::Transport(_) => TRANSPORT_ERROR,
        ClientError::Frame(_) | ClientError::Protocol(_) => DATA_INVALID,
        ClientError::Timeout(_) => TIMEOUT,
        ClientError::BadParameter(_) | ClientError::WrongContext(_) => USAGE,
        ClientError::NotConnected
        | ClientError::AlreadyConnected
        | ClientError::Disconnected
        | ClientError::CommandFailed { .. } => FAILURE,
        ClientError::ModuleRestarted => SUCCESS,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeout_maps_to_timeout_code() {
        let err = client_error("request failed", ClientError::Timeout(Duration::from_secs(2)));
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn bad_parameter_maps_to_usage() {
        let err = client_error("set baud", ClientError::BadParameter("nope".into()));
        assert_eq!(err.code, USAGE);
        assert!(err.to_string().contains("set baud"));
    }
}
