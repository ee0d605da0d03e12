//! Control channel to the instrumentation harness running next to the SUT
//!
//! The harness starts and resets the SUT, reports its base URL, answers
//! coverage queries for target ids and executes database insertions. The
//! `RemoteController` trait is the seam the evaluator depends on;
//! `HttpRemoteController` speaks the harness REST API:
//!
//! | operation          | request                               |
//! |--------------------|---------------------------------------|
//! | start / reset      | `PUT  /runSUT` `{run, resetState}`    |
//! | SUT info           | `GET  /infoSUT`                       |
//! | target coverage    | `GET  /testResults?ids=1,2,3`         |
//! | database insertion | `POST /databaseCommand`               |
//!
//! Every response is wrapped as `{"data": ..., "error": ...}`.

use crate::database::InsertionDto;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Path of the harness API below `http://host:port`
pub const CONTROLLER_API_PATH: &str = "/controller/api";

/// Type alias for controller operation results
pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("Cannot reach remote controller at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Remote controller returned status {status} for {endpoint}")]
    BadStatus { endpoint: String, status: u16 },

    #[error("Remote controller error: {0}")]
    Remote(String),

    #[error("Invalid controller response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SutInfoDto {
    #[serde(rename = "baseUrlOfSUT")]
    pub base_url_of_sut: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SutRunDto {
    pub run: bool,
    pub reset_state: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfoDto {
    pub id: i32,
    pub value: f64,
    #[serde(default)]
    pub descriptive_id: Option<String>,
}

impl TargetInfoDto {
    pub fn new(id: i32, value: f64) -> Self {
        Self {
            id,
            value,
            descriptive_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestResultsDto {
    #[serde(default)]
    pub targets: Vec<TargetInfoDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseCommandDto {
    pub insertions: Vec<InsertionDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct WrappedResponseDto<T> {
    data: Option<T>,
    error: Option<String>,
}

/// Operations the evaluator needs from the instrumentation harness
pub trait RemoteController {
    /// Start the SUT. Called once, before the search begins.
    fn start_sut(&mut self) -> ControllerResult<()>;

    /// Bring the SUT back to a known state. Called before every evaluation.
    fn reset_sut(&mut self) -> ControllerResult<()>;

    fn sut_info(&mut self) -> ControllerResult<SutInfoDto>;

    /// Coverage for the given target ids. The harness may also report
    /// targets that were not asked for, e.g. newly reached ones.
    fn target_coverage(&mut self, ids: &HashSet<i32>) -> ControllerResult<TestResultsDto>;

    fn execute_database_command(&mut self, command: &DatabaseCommandDto) -> ControllerResult<()>;
}

/// `RemoteController` over the harness REST API
#[derive(Debug, Clone)]
pub struct HttpRemoteController {
    api: Url,
    client: reqwest::blocking::Client,
}

impl HttpRemoteController {
    pub fn new(host: &str, port: u16, timeout: Duration) -> ControllerResult<Self> {
        let base = format!("http://{}:{}{}/", host, port, CONTROLLER_API_PATH);
        let api = Url::parse(&base).map_err(|e| ControllerError::Unreachable {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControllerError::Unreachable {
                url: base,
                reason: e.to_string(),
            })?;
        Ok(Self { api, client })
    }

    fn endpoint(&self, name: &str) -> ControllerResult<Url> {
        self.api
            .join(name)
            .map_err(|e| ControllerError::InvalidResponse(e.to_string()))
    }

    fn send<T: DeserializeOwned>(
        &self,
        endpoint: &Url,
        request: reqwest::blocking::RequestBuilder,
    ) -> ControllerResult<Option<T>> {
        debug!("Calling remote controller: {}", endpoint);
        let response = request.send().map_err(|e| ControllerError::Unreachable {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ControllerError::BadStatus {
                endpoint: endpoint.path().to_string(),
                status,
            });
        }
        let text = response
            .text()
            .map_err(|e| ControllerError::InvalidResponse(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let wrapped: WrappedResponseDto<T> = serde_json::from_str(&text)
            .map_err(|e| ControllerError::InvalidResponse(e.to_string()))?;
        if let Some(error) = wrapped.error {
            return Err(ControllerError::Remote(error));
        }
        Ok(wrapped.data)
    }

    fn run_sut(&self, reset_state: bool) -> ControllerResult<()> {
        let url = self.endpoint("runSUT")?;
        let dto = SutRunDto {
            run: true,
            reset_state,
        };
        let request = self.client.put(url.clone()).json(&dto);
        self.send::<serde_json::Value>(&url, request).map(|_| ())
    }
}

impl RemoteController for HttpRemoteController {
    fn start_sut(&mut self) -> ControllerResult<()> {
        self.run_sut(false)
    }

    fn reset_sut(&mut self) -> ControllerResult<()> {
        self.run_sut(true)
    }

    fn sut_info(&mut self) -> ControllerResult<SutInfoDto> {
        let url = self.endpoint("infoSUT")?;
        let request = self.client.get(url.clone());
        self.send(&url, request)?
            .ok_or_else(|| ControllerError::InvalidResponse("missing SUT info".to_string()))
    }

    fn target_coverage(&mut self, ids: &HashSet<i32>) -> ControllerResult<TestResultsDto> {
        let mut url = self.endpoint("testResults")?;
        let mut sorted: Vec<i32> = ids.iter().copied().collect();
        sorted.sort_unstable();
        let joined = sorted
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut().append_pair("ids", &joined);

        let request = self.client.get(url.clone());
        Ok(self.send(&url, request)?.unwrap_or_default())
    }

    fn execute_database_command(&mut self, command: &DatabaseCommandDto) -> ControllerResult<()> {
        let url = self.endpoint("databaseCommand")?;
        let request = self.client.post(url.clone()).json(command);
        self.send::<serde_json::Value>(&url, request).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_under_api_path() {
        let controller = HttpRemoteController::new("localhost", 40100, Duration::from_secs(1)).unwrap();
        assert_eq!(
            controller.endpoint("infoSUT").unwrap().as_str(),
            "http://localhost:40100/controller/api/infoSUT"
        );
    }

    #[test]
    fn test_wrapped_response_parsing() {
        let json = r#"{"data": {"targets": [{"id": 42, "value": 1.0, "descriptiveId": "Line_12"}]}, "error": null}"#;
        let wrapped: WrappedResponseDto<TestResultsDto> = serde_json::from_str(json).unwrap();
        let targets = wrapped.data.unwrap().targets;
        assert_eq!(targets[0].id, 42);
        assert_eq!(targets[0].descriptive_id.as_deref(), Some("Line_12"));
    }

    #[test]
    fn test_sut_info_field_name() {
        let info: SutInfoDto = serde_json::from_str(r#"{"baseUrlOfSUT": "http://localhost:8080"}"#).unwrap();
        assert_eq!(info.base_url_of_sut, "http://localhost:8080");
    }

    #[test]
    fn test_unreachable_controller() {
        let mut controller = HttpRemoteController::new("127.0.0.1", 1, Duration::from_millis(500)).unwrap();
        assert!(matches!(
            controller.reset_sut(),
            Err(ControllerError::Unreachable { .. })
        ));
    }
}
