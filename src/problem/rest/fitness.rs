//! Evaluation of REST individuals against the running SUT
//!
//! One evaluation resets the SUT, executes the SQL insertions and then the
//! REST calls in order, and finally asks the instrumentation for the
//! coverage of a bounded subset of the targets not covered yet.
//!
//! ## Chaining
//!
//! A call flagged with `save_location` stores the `location` header of its
//! response under `location_<last path element>`. A later call whose
//! `location_id` names that key is sent to the stored location instead of
//! its own templated URL. The chain state lives for one evaluation only.
//!
//! ## Halting
//!
//! Execution stops after the first action whose result carries the stop
//! flag: a failed insertion, a call that got no response, or a non-2xx
//! response to a call whose location is needed later. A call depending on
//! a location that was never stored also ends the sequence. Results
//! collected so far always stand.
//!
//! ## Targets
//!
//! Besides the instrumentation targets, every executed call contributes a
//! local target `<status>:<VERB>:<path>`, always covered, which rewards
//! reaching new status codes on each endpoint.

use super::action::RestCallAction;
use super::controller::{DatabaseCommandDto, RemoteController};
use super::http::{HttpClient, HttpRequest, RequestBody};
use super::individual::RestIndividual;
use super::param::{ParamKind, DEFAULT_BODY_CONTENT_TYPE};
use super::path::resolve_location;
use super::result::RestCallResult;
use crate::database::{SqlInsertAction, SqlInsertResult};
use crate::randomness::Randomness;
use crate::search::{
    Action, ActionResult, Archive, EvaluatedIndividual, EvaluationError, FitnessFunction,
    FitnessValue, IdMapper, Individual,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use url::Url;

/// Maximum number of target ids asked about in one coverage request
pub const DEFAULT_TARGETS_PER_REQUEST: usize = 100;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Failure of the initial handshake with the remote controller. Fatal for
/// the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("Cannot communicate with remote controller: {0}")]
    ControllerUnavailable(String),

    #[error("Cannot retrieve SUT info from remote controller: {0}")]
    SutInfoUnavailable(String),

    #[error("Invalid SUT base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Fitness function executing `RestIndividual`s through an `HttpClient`,
/// with the SUT controlled through a `RemoteController`
#[derive(Debug)]
pub struct RestFitness<C, H> {
    controller: C,
    client: H,
    base_url: Url,
    id_mapper: IdMapper,
    targets_per_request: usize,
}

impl<C: RemoteController, H: HttpClient> RestFitness<C, H> {
    /// Start the SUT and fetch its base URL
    pub fn new(mut controller: C, client: H, targets_per_request: usize) -> Result<Self, SetupError> {
        controller
            .start_sut()
            .map_err(|e| SetupError::ControllerUnavailable(e.to_string()))?;
        let info = controller
            .sut_info()
            .map_err(|e| SetupError::SutInfoUnavailable(e.to_string()))?;
        let base_url = parse_base_url(&info.base_url_of_sut)?;
        info!("SUT started at {}", base_url);

        Ok(Self {
            controller,
            client,
            base_url,
            id_mapper: IdMapper::new(),
            targets_per_request,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn id_mapper(&self) -> &IdMapper {
        &self.id_mapper
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn client(&self) -> &H {
        &self.client
    }

    fn execute_insertion(&mut self, insertion: &SqlInsertAction) -> SqlInsertResult {
        debug!("Executing {}", insertion.to_sql());
        let command = DatabaseCommandDto {
            insertions: vec![insertion.to_insertion_dto()],
        };
        let success = match self.controller.execute_database_command(&command) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to execute {}: {}", insertion.name(), e);
                false
            }
        };
        SqlInsertResult {
            table: insertion.table_name().to_string(),
            success,
        }
    }

    fn execute_call(
        &self,
        action: &RestCallAction,
        chain_state: &mut HashMap<String, String>,
    ) -> Result<RestCallResult, EvaluationError> {
        let expected = match action.resolve_url(&self.base_url) {
            Ok(url) => url,
            Err(e) => return Ok(RestCallResult::failed(e.to_string())),
        };
        let url = match action.location_id() {
            Some(key) => {
                let location = chain_state
                    .get(&location_name(key))
                    .ok_or_else(|| EvaluationError::MissingChainedLocation(location_name(key)))?;
                match resolve_location(location, &self.base_url, &expected) {
                    Ok(url) => url,
                    Err(e) => return Ok(RestCallResult::failed(e.to_string())),
                }
            }
            None => expected,
        };

        let request = build_request(action, url);
        debug!("{} {}", request.verb, request.url);
        let response = match self.client.execute(&request) {
            Ok(response) => response,
            Err(e) => {
                debug!("No response for {}: {}", action.name(), e);
                return Ok(RestCallResult::failed(e.to_string()));
            }
        };

        if response.status == 401 && !action.auth().is_no_auth() {
            warn!(
                "Got 401 although having auth for '{}' on {}",
                action.auth().name(),
                action.name()
            );
        }

        let success = response.is_success();
        let location = response.header("location").unwrap_or("").to_string();
        let mut result = RestCallResult {
            status_code: Some(response.status),
            body_type: response.content_type,
            body: response.body,
            stopping: false,
            error: None,
        };

        if action.save_location() {
            if !success {
                result.stopping = true;
                return Ok(result);
            }
            chain_state.insert(location_name(&action.location_key()), location);
        }
        Ok(result)
    }

    /// Mark `<status>:<action name>` covered for every call that got a response
    fn handle_response_targets(
        &mut self,
        fitness: &mut FitnessValue,
        actions: &[&Action],
        results: &[ActionResult],
    ) {
        for (action, result) in actions.iter().zip(results) {
            let (Some(call), Some(call_result)) = (action.as_rest_call(), result.as_rest_call()) else {
                continue;
            };
            if let Some(status) = call_result.status_code {
                let id = self
                    .id_mapper
                    .handle_local_target(&format!("{}:{}", status, call.name()));
                fitness.cover_target(id);
            }
        }
    }
}

impl<C: RemoteController, H: HttpClient> FitnessFunction<RestIndividual> for RestFitness<C, H> {
    fn evaluate(
        &mut self,
        individual: &RestIndividual,
        archive: &Archive<RestIndividual>,
        randomness: &mut Randomness,
    ) -> Result<EvaluatedIndividual<RestIndividual>, EvaluationError> {
        self.controller
            .reset_sut()
            .map_err(|e| EvaluationError::SutUnreachable(e.to_string()))?;

        let actions: Vec<&Action> = individual
            .see_initializing_actions()
            .iter()
            .chain(individual.see_actions())
            .collect();
        let mut results: Vec<ActionResult> = Vec::with_capacity(actions.len());
        let mut chain_state: HashMap<String, String> = HashMap::new();

        for action in &actions {
            let result = match action {
                Action::SqlInsert(insertion) => ActionResult::SqlInsert(self.execute_insertion(insertion)),
                Action::RestCall(call) => match self.execute_call(call, &mut chain_state) {
                    Ok(result) => ActionResult::RestCall(result),
                    Err(e) => {
                        debug!("Stopping evaluation at {}: {}", call.name(), e);
                        break;
                    }
                },
            };
            let stop = result.stopping();
            results.push(result);
            if stop {
                break;
            }
        }

        let ids = archive.choose_targets(self.targets_per_request, randomness);
        let coverage = self
            .controller
            .target_coverage(&ids)
            .map_err(|e| EvaluationError::CoverageUnavailable(e.to_string()))?;

        let mut fitness = FitnessValue::new(individual.size() as f64);
        for target in coverage.targets {
            if let Some(descriptive_id) = &target.descriptive_id {
                self.id_mapper.add_mapping(target.id, descriptive_id);
            }
            if let Err(e) = fitness.update_target(target.id, target.value) {
                warn!("Skipping coverage of target {}: {}", target.id, e);
            }
        }
        self.handle_response_targets(&mut fitness, &actions, &results);

        Ok(EvaluatedIndividual::new(fitness, individual.copy(), results))
    }
}

fn location_name(key: &str) -> String {
    format!("location_{}", key)
}

fn parse_base_url(raw: &str) -> Result<Url, SetupError> {
    let invalid = |reason: String| SetupError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// HTTP request for `action` sent to `url`: auth headers, header
/// parameters, then the payload
fn build_request(action: &RestCallAction, url: Url) -> HttpRequest {
    let mut headers: Vec<(String, String)> = action
        .auth()
        .headers()
        .iter()
        .map(|h| (h.name.clone(), h.value.clone()))
        .collect();
    headers.extend(
        action
            .params_of_kind(ParamKind::Header)
            .map(|p| (p.name().to_string(), p.gene().raw_value())),
    );

    let mut forms = action.params_of_kind(ParamKind::Form).peekable();
    let body = if let Some(body) = action.body_param() {
        Some(RequestBody {
            content_type: body.content_type().to_string(),
            payload: body.gene().render(),
        })
    } else if forms.peek().is_some() {
        let payload = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(forms.map(|p| (p.name().to_string(), p.gene().raw_value())))
            .finish();
        Some(RequestBody {
            content_type: FORM_CONTENT_TYPE.to_string(),
            payload,
        })
    } else if action.verb().has_body() {
        Some(RequestBody {
            content_type: DEFAULT_BODY_CONTENT_TYPE.to_string(),
            payload: String::new(),
        })
    } else {
        None
    };

    HttpRequest {
        verb: action.verb(),
        url,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{Gene, IntegerGene, StringGene};
    use crate::problem::rest::{HttpVerb, Param, RestPath};

    #[test]
    fn test_base_url_normalized() {
        assert_eq!(parse_base_url("http://localhost:8080").unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(parse_base_url("http://localhost:8080/app").unwrap().as_str(), "http://localhost:8080/app/");
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_form_body_is_encoded() {
        let mut name: Gene = StringGene::new("name", 0, 20).into();
        name.set_value_from_string("a b&c").unwrap();
        let action = RestCallAction::new(
            HttpVerb::Post,
            RestPath::parse("/items").unwrap(),
            vec![Param::form(name), Param::form(IntegerGene::new("n", 0, 9).into())],
        )
        .unwrap();
        let request = build_request(&action, Url::parse("http://localhost/items").unwrap());
        let body = request.body.unwrap();
        assert_eq!(body.content_type, FORM_CONTENT_TYPE);
        assert_eq!(body.payload, "name=a+b%26c&n=0");
    }

    #[test]
    fn test_body_only_for_verbs_with_payload() {
        let get = RestCallAction::new(HttpVerb::Get, RestPath::parse("/items").unwrap(), vec![]).unwrap();
        let put = RestCallAction::new(HttpVerb::Put, RestPath::parse("/items").unwrap(), vec![]).unwrap();
        let url = Url::parse("http://localhost/items").unwrap();
        assert!(build_request(&get, url.clone()).body.is_none());
        let body = build_request(&put, url).body.unwrap();
        assert_eq!(body.content_type, DEFAULT_BODY_CONTENT_TYPE);
        assert!(body.payload.is_empty());
    }
}
