/// Observed outcome of one executed REST call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestCallResult {
    /// Absent when the call never got a response (timeout, refused connection)
    pub status_code: Option<u16>,
    pub body_type: Option<String>,
    pub body: Option<String>,
    /// The remaining actions of the test were not executed after this one
    pub stopping: bool,
    /// Transport failure, if any
    pub error: Option<String>,
}

impl RestCallResult {
    pub fn with_status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Default::default()
        }
    }

    /// A call that produced no response
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            stopping: true,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(s) if (200..300).contains(&s))
    }
}
