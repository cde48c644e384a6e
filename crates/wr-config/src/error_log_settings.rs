use serde::Deserialize;

/// Independently switchable diagnostic logging toggles for the server engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorLogSettings {
    pub condition_handling: bool,
    pub file_not_found: bool,
    pub request_handling: bool,
    pub request_header: bool,
    pub request_header_on_error: bool,
    pub response_header: bool,
    pub timeouts: bool,
}

impl ErrorLogSettings {
    /// Every toggle switched on.
    pub const fn all() -> Self {
        Self {
            condition_handling: true,
            file_not_found: true,
            request_handling: true,
            request_header: true,
            request_header_on_error: true,
            response_header: true,
            timeouts: true,
        }
    }

    pub const fn any_enabled(&self) -> bool {
        self.condition_handling
            || self.file_not_found
            || self.request_handling
            || self.request_header
            || self.request_header_on_error
            || self.response_header
            || self.timeouts
    }
}
