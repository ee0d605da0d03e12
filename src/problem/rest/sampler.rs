//! Sampling of REST individuals from the endpoints of the SUT
//!
//! Templates are `RestCallAction`s describing every callable endpoint, as
//! extracted from the API schema. Sampling clones and randomizes them:
//!
//! - **Random**: 1 to `max_test_size` calls to random endpoints
//! - **Smart**: a POST on a collection followed by a call on one element of
//!   that collection, addressed through the `location` the POST returned
//!
//! When a `SqlInsertBuilder` is available, some individuals are seeded with
//! insertions into one random table.

use super::action::RestCallAction;
use super::auth::AuthenticationInfo;
use super::http::HttpVerb;
use super::individual::{RestIndividual, SampleType};
use super::{RestError, RestResult};
use crate::database::{SqlInsertBuilder, ALL_COLUMNS};
use crate::randomness::Randomness;
use crate::search::{Individual, Sampler};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Probability of sending a call without credentials when some are configured
const NO_AUTH_PROBABILITY: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerConfig {
    /// Maximum number of REST calls in one test
    pub max_test_size: usize,

    pub probability_of_smart_sampling: f64,

    /// Probability of seeding the database of a sampled test
    pub probability_of_db_seeding: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_test_size: 10,
            probability_of_smart_sampling: 0.5,
            probability_of_db_seeding: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestSampler {
    config: SamplerConfig,
    templates: Vec<RestCallAction>,
    /// (POST on a collection, call on one of its elements), as template indices
    smart_pairs: Vec<(usize, usize)>,
    authentications: Vec<AuthenticationInfo>,
    sql_builder: Option<SqlInsertBuilder>,
}

impl RestSampler {
    pub fn new(templates: Vec<RestCallAction>, config: SamplerConfig) -> RestResult<Self> {
        if templates.is_empty() {
            return Err(RestError::InvalidAction("no endpoint to sample from".to_string()));
        }

        let mut smart_pairs = Vec::new();
        for (i, post) in templates.iter().enumerate() {
            if post.verb() != HttpVerb::Post {
                continue;
            }
            for (j, dependent) in templates.iter().enumerate() {
                if post.path().is_collection_of(dependent.path()) {
                    smart_pairs.push((i, j));
                }
            }
        }
        debug!(
            "Sampler built from {} endpoints, {} POST/dependent pairs",
            templates.len(),
            smart_pairs.len()
        );

        Ok(Self {
            config,
            templates,
            smart_pairs,
            authentications: Vec::new(),
            sql_builder: None,
        })
    }

    pub fn with_authentications(mut self, authentications: Vec<AuthenticationInfo>) -> Self {
        self.authentications = authentications;
        self
    }

    pub fn with_sql_builder(mut self, builder: SqlInsertBuilder) -> Self {
        self.sql_builder = Some(builder);
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn templates(&self) -> &[RestCallAction] {
        &self.templates
    }

    pub fn smart_pairs(&self) -> &[(usize, usize)] {
        &self.smart_pairs
    }

    fn random_auth(&self, randomness: &mut Randomness) -> AuthenticationInfo {
        if self.authentications.is_empty() || randomness.next_bool_with_probability(NO_AUTH_PROBABILITY) {
            return AuthenticationInfo::NoAuth;
        }
        randomness
            .choose(&self.authentications)
            .cloned()
            .unwrap_or_default()
    }

    fn instantiate(&self, index: usize, auth: &AuthenticationInfo, randomness: &mut Randomness) -> RestCallAction {
        let mut action = self.templates[index].clone().with_auth(auth.clone());
        action.randomize(randomness);
        action
    }

    fn random_action(&self, randomness: &mut Randomness) -> RestCallAction {
        let auth = self.random_auth(randomness);
        let index = randomness.choose_index(self.templates.len()).unwrap_or(0);
        self.instantiate(index, &auth, randomness)
    }

    fn sample_random(&self, randomness: &mut Randomness) -> RestIndividual {
        let size = randomness.next_usize(1, self.config.max_test_size.max(1));
        let actions = (0..size).map(|_| self.random_action(randomness)).collect();
        RestIndividual::new(actions, SampleType::Random)
    }

    fn sample_smart(&self, randomness: &mut Randomness) -> Option<RestIndividual> {
        let (post_index, dependent_index) = *randomness.choose(&self.smart_pairs)?;
        let auth = self.random_auth(randomness);

        let post = self
            .instantiate(post_index, &auth, randomness)
            .with_save_location(true);
        let dependent = self
            .instantiate(dependent_index, &auth, randomness)
            .with_location_id(post.location_key());
        Some(RestIndividual::new(vec![post, dependent], SampleType::Smart))
    }

    fn seed_database(&self, individual: RestIndividual, randomness: &mut Randomness) -> RestIndividual {
        let builder = match &self.sql_builder {
            Some(builder) => builder,
            None => return individual,
        };
        let tables = builder.table_names();
        let table = match randomness.choose(&tables) {
            Some(table) => *table,
            None => return individual,
        };

        let all: HashSet<String> = std::iter::once(ALL_COLUMNS.to_string()).collect();
        match builder.create_sql_insertion_action(table, &all) {
            Ok(mut insertions) => {
                for insertion in &mut insertions {
                    insertion.randomize(randomness);
                }
                individual.with_db_initialization(insertions)
            }
            Err(e) => {
                debug!("Cannot seed table {}: {}", table, e);
                individual
            }
        }
    }
}

impl Sampler<RestIndividual> for RestSampler {
    fn sample(&mut self, randomness: &mut Randomness) -> RestIndividual {
        let smart = !self.smart_pairs.is_empty()
            && randomness.next_bool_with_probability(self.config.probability_of_smart_sampling);
        let individual = if smart {
            self.sample_smart(randomness)
                .unwrap_or_else(|| self.sample_random(randomness))
        } else {
            self.sample_random(randomness)
        };

        if self.sql_builder.is_some()
            && randomness.next_bool_with_probability(self.config.probability_of_db_seeding)
        {
            self.seed_database(individual, randomness)
        } else {
            individual
        }
    }

    /// Add or remove one call, keeping between 1 and `max_test_size` calls
    fn mutate_structure(&mut self, individual: &mut RestIndividual, randomness: &mut Randomness) {
        let count = individual.see_actions().len();
        let can_add = count < self.config.max_test_size;
        let can_remove = count > 1;

        let add = match (can_add, can_remove) {
            (true, true) => randomness.next_bool(),
            (true, false) => true,
            (false, true) => false,
            (false, false) => return,
        };
        if add {
            let position = randomness.next_usize(0, count);
            let action = self.random_action(randomness);
            individual.insert_action(position, action);
        } else if let Some(index) = randomness.choose_index(count) {
            individual.remove_action(index);
        }
    }
}
