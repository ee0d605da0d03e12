//! In-memory doubles of the SUT collaborators shared by the integration tests

#![allow(dead_code)]

use evosearch::problem::rest::{
    ControllerError, ControllerResult, DatabaseCommandDto, HttpClient, HttpError, HttpRequest,
    HttpResponse, RemoteController, SutInfoDto, TargetInfoDto, TestResultsDto,
};
use std::cell::RefCell;
use std::collections::HashSet;

pub const BASE_URL: &str = "http://localhost:8080";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Remote controller recording every command it receives
#[derive(Debug, Default)]
pub struct FakeController {
    pub fail_start: bool,
    pub fail_reset: bool,
    pub fail_coverage: bool,
    pub fail_database: bool,
    pub targets: Vec<TargetInfoDto>,
    pub resets: usize,
    pub requested_ids: Vec<HashSet<i32>>,
    pub database_commands: Vec<DatabaseCommandDto>,
}

impl FakeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reporting(targets: Vec<TargetInfoDto>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    fn unreachable() -> ControllerError {
        ControllerError::Unreachable {
            url: "http://localhost:40100/controller/api".to_string(),
            reason: "connection refused".to_string(),
        }
    }
}

impl RemoteController for FakeController {
    fn start_sut(&mut self) -> ControllerResult<()> {
        if self.fail_start {
            return Err(Self::unreachable());
        }
        Ok(())
    }

    fn reset_sut(&mut self) -> ControllerResult<()> {
        if self.fail_reset {
            return Err(Self::unreachable());
        }
        self.resets += 1;
        Ok(())
    }

    fn sut_info(&mut self) -> ControllerResult<SutInfoDto> {
        Ok(SutInfoDto {
            base_url_of_sut: BASE_URL.to_string(),
        })
    }

    fn target_coverage(&mut self, ids: &HashSet<i32>) -> ControllerResult<TestResultsDto> {
        if self.fail_coverage {
            return Err(Self::unreachable());
        }
        self.requested_ids.push(ids.clone());
        Ok(TestResultsDto {
            targets: self.targets.clone(),
        })
    }

    fn execute_database_command(&mut self, command: &DatabaseCommandDto) -> ControllerResult<()> {
        if self.fail_database {
            return Err(ControllerError::Remote("constraint violation".to_string()));
        }
        self.database_commands.push(command.clone());
        Ok(())
    }
}

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError>>;

/// HTTP client answering from a closure and recording the requests
pub struct FakeHttpClient {
    responder: Responder,
    pub requests: RefCell<Vec<HttpRequest>>,
}

impl FakeHttpClient {
    pub fn new(responder: impl Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Every call answered with the same status
    pub fn always(status: u16) -> Self {
        Self::new(move |_| Ok(HttpResponse::new(status)))
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.borrow()[index].clone()
    }
}

impl std::fmt::Debug for FakeHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeHttpClient")
            .field("requests", &self.requests.borrow().len())
            .finish()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(request.clone());
        (self.responder)(request)
    }
}
