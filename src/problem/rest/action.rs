use super::auth::AuthenticationInfo;
use super::http::HttpVerb;
use super::param::{Param, ParamKind};
use super::path::RestPath;
use super::{RestError, RestResult};
use crate::gene::Gene;
use crate::randomness::Randomness;
use std::collections::HashSet;
use url::Url;

/// One HTTP call towards an endpoint of the SUT
#[derive(Debug, Clone, PartialEq)]
pub struct RestCallAction {
    verb: HttpVerb,
    path: RestPath,
    parameters: Vec<Param>,
    auth: AuthenticationInfo,
    /// Store the `location` header of the response for later actions
    save_location: bool,
    /// Location key of an earlier action whose resource this call targets
    location_id: Option<String>,
}

impl RestCallAction {
    /// Create a call, checking the parameters against the path template
    pub fn new(verb: HttpVerb, path: RestPath, parameters: Vec<Param>) -> RestResult<Self> {
        let action = Self {
            verb,
            path,
            parameters,
            auth: AuthenticationInfo::NoAuth,
            save_location: false,
            location_id: None,
        };
        action.check_parameters()?;
        Ok(action)
    }

    pub fn with_auth(mut self, auth: AuthenticationInfo) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_save_location(mut self, save_location: bool) -> Self {
        self.save_location = save_location;
        self
    }

    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn set_save_location(&mut self, save_location: bool) {
        self.save_location = save_location;
    }

    pub fn set_location_id(&mut self, location_id: Option<String>) {
        self.location_id = location_id;
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn path(&self) -> &RestPath {
        &self.path
    }

    pub fn parameters(&self) -> &[Param] {
        &self.parameters
    }

    pub fn auth(&self) -> &AuthenticationInfo {
        &self.auth
    }

    pub fn save_location(&self) -> bool {
        self.save_location
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    /// Endpoint identity, e.g. `POST:/api/items`
    pub fn name(&self) -> String {
        format!("{}:{}", self.verb, self.path)
    }

    /// Key under which this call's `location` header is chained
    pub fn location_key(&self) -> String {
        self.path.last_element()
    }

    pub fn body_param(&self) -> Option<&Param> {
        self.parameters.iter().find(|p| p.kind() == ParamKind::Body)
    }

    pub fn params_of_kind(&self, kind: ParamKind) -> impl Iterator<Item = &Param> {
        self.parameters.iter().filter(move |p| p.kind() == kind)
    }

    pub fn see_genes(&self) -> Vec<&Gene> {
        self.parameters.iter().map(Param::gene).collect()
    }

    pub fn see_genes_mut(&mut self) -> Vec<&mut Gene> {
        self.parameters.iter_mut().map(Param::gene_mut).collect()
    }

    pub fn randomize(&mut self, randomness: &mut Randomness) {
        for param in &mut self.parameters {
            param.gene_mut().randomize(randomness);
        }
    }

    /// URL built from the path template and the current gene values
    pub fn resolve_url(&self, base: &Url) -> RestResult<Url> {
        self.path.resolve_url(base, &self.parameters)
    }

    /// The parameters must match the endpoint: one path parameter per
    /// template variable and nothing else, at most one body, and never a
    /// body together with form fields.
    pub fn check_parameters(&self) -> RestResult<()> {
        let variables: HashSet<&str> = self.path.variables().into_iter().collect();
        let path_params: Vec<&str> = self.params_of_kind(ParamKind::Path).map(Param::name).collect();
        let distinct: HashSet<&str> = path_params.iter().copied().collect();
        if distinct != variables || distinct.len() != path_params.len() {
            return Err(RestError::InvalidAction(format!(
                "{}: path parameters {:?} do not match template variables {:?}",
                self.name(),
                path_params,
                self.path.variables()
            )));
        }

        let bodies = self.params_of_kind(ParamKind::Body).count();
        if bodies > 1 {
            return Err(RestError::InvalidAction(format!(
                "{}: {} body parameters",
                self.name(),
                bodies
            )));
        }
        if bodies == 1 && self.params_of_kind(ParamKind::Form).next().is_some() {
            return Err(RestError::InvalidAction(format!(
                "{}: both body and form parameters",
                self.name()
            )));
        }
        Ok(())
    }

    /// Parameters match the endpoint and every gene holds a valid value
    pub fn verify(&self) -> bool {
        self.check_parameters().is_ok() && self.parameters.iter().all(|p| p.gene().is_valid())
    }
}
