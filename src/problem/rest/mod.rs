//! REST problem: calls to the endpoints of a web service under test
//!
//! This module provides the REST-specific parts of the search:
//!
//! - **Action model**: `RestCallAction` built from a `RestPath` template and
//!   typed `Param`s, plus the authentication attached to it
//! - **Individual**: `RestIndividual`, SQL seeding followed by REST calls
//! - **Sampler**: `RestSampler`, random and smart (POST then dependent call)
//!   sampling with optional database seeding
//! - **Evaluation**: `RestFitness`, executing an individual against the SUT
//!   through the `HttpClient` and `RemoteController` seams

mod action;
mod auth;
mod controller;
mod fitness;
mod http;
mod individual;
mod param;
mod path;
mod result;
mod sampler;

pub use self::action::RestCallAction;
pub use self::auth::{AuthenticationHeader, AuthenticationInfo};
pub use self::controller::{
    ControllerError, ControllerResult, DatabaseCommandDto, HttpRemoteController, RemoteController,
    SutInfoDto, SutRunDto, TargetInfoDto, TestResultsDto, CONTROLLER_API_PATH,
};
pub use self::fitness::{RestFitness, SetupError, DEFAULT_TARGETS_PER_REQUEST};
pub use self::http::{
    BlockingHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, HttpVerb, RequestBody,
};
pub use self::individual::{RestIndividual, SampleType, MAX_REPAIR_ATTEMPTS};
pub use self::param::{Param, ParamKind, DEFAULT_BODY_CONTENT_TYPE};
pub use self::path::{resolve_location, RestPath};
pub use self::result::RestCallResult;
pub use self::sampler::{RestSampler, SamplerConfig};

/// Type alias for REST model results
pub type RestResult<T> = Result<T, RestError>;

/// Errors raised while building or resolving REST calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestError {
    #[error("Invalid path template: {0}")]
    InvalidPath(String),

    #[error("No value for path parameter '{0}'")]
    MissingPathParameter(String),

    #[error("Invalid REST action: {0}")]
    InvalidAction(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
