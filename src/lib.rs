//! # evosearch
//!
//! Search-based test generation for RESTful services.
//!
//! Candidate test cases are sequences of actions (SQL insertions seeding the
//! database, then HTTP calls), built from typed genes. The search evolves
//! them against the running system under test, guided by the coverage its
//! instrumentation reports, and keeps the best test found for every
//! coverage target in an archive.
//!
//! ```no_run
//! use evosearch::{EngineConfig, RestFitness, RestSampler, SearchRunner};
//! # fn endpoints() -> Vec<evosearch::RestCallAction> { unimplemented!() }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_json_file("evosearch.json")?;
//! let fitness = RestFitness::new(
//!     config.controller.connect()?,
//!     config.http.client()?,
//!     config.http.targets_per_request,
//! )?;
//! let sampler = RestSampler::new(endpoints(), config.sampler.clone())?;
//! let solution = SearchRunner::new(config.search.clone(), sampler, fitness).search();
//! println!("{} targets covered", solution.covered_targets());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod gene;
pub mod problem;
pub mod randomness;
pub mod search;

// Re-export core types for easy access
pub use config::{ConfigError, ConfigResult, ControllerConfig, EngineConfig, HttpConfig};
pub use database::{ColumnDto, DatabaseError, DbSchemaDto, SqlInsertAction, SqlInsertBuilder, TableDto};
pub use gene::{BooleanGene, EnumGene, Gene, GeneError, GeneKind, IntegerGene, ObjectGene, StringGene};
pub use problem::rest::{
    AuthenticationInfo, BlockingHttpClient, HttpClient, HttpRemoteController, HttpVerb, Param,
    RemoteController, RestCallAction, RestFitness, RestIndividual, RestPath, RestSampler,
    SampleType, SetupError,
};
pub use randomness::Randomness;
pub use search::{
    Action, ActionResult, Archive, EvaluatedIndividual, EvaluationError, FitnessFunction,
    FitnessValue, GeneFilter, Individual, SearchConfig, SearchRunner, SearchStats, Solution,
};
