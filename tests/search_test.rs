//! Whole search runs against faked SUT collaborators

mod common;

use common::{init_logging, FakeController, FakeHttpClient};
use evosearch::gene::IntegerGene;
use evosearch::problem::rest::{
    HttpResponse, HttpVerb, Param, RestCallAction, RestFitness, RestPath, RestSampler,
    SamplerConfig, TargetInfoDto,
};
use evosearch::search::{IdMapper, Individual, SearchConfig, SearchRunner};

fn templates() -> Vec<RestCallAction> {
    let call = |verb, template: &str, params| {
        RestCallAction::new(verb, RestPath::parse(template).unwrap(), params).unwrap()
    };
    vec![
        call(HttpVerb::Post, "/api/items", vec![]),
        call(
            HttpVerb::Get,
            "/api/items/{id}",
            vec![Param::path(IntegerGene::new("id", 0, 100).into())],
        ),
        call(HttpVerb::Get, "/api/users", vec![]),
    ]
}

/// Items above 50 do not exist
fn sut_client() -> FakeHttpClient {
    FakeHttpClient::new(|request| {
        let last: i64 = request
            .url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        match request.verb {
            HttpVerb::Post => Ok(HttpResponse::new(201).with_header("location", "/api/items/7")),
            _ if last > 50 => Ok(HttpResponse::new(404)),
            _ => Ok(HttpResponse::new(200)),
        }
    })
}

fn search_config(max_evaluations: u64) -> SearchConfig {
    SearchConfig {
        max_evaluations: Some(max_evaluations),
        seed: 3,
        progress_interval: 10,
        ..Default::default()
    }
}

#[test]
fn test_search_against_fake_sut() {
    init_logging();
    let controller = FakeController::reporting(vec![TargetInfoDto::new(1, 1.0), TargetInfoDto::new(2, 0.5)]);
    let fitness = RestFitness::new(controller, sut_client(), 100).unwrap();
    let sampler = RestSampler::new(templates(), SamplerConfig::default()).unwrap();

    let mut runner = SearchRunner::new(search_config(40), sampler, fitness);
    let solution = runner.search();

    let stats = runner.stats();
    assert_eq!(stats.iterations, 40);
    assert_eq!(stats.evaluations, 40);
    assert_eq!(stats.failed_evaluations(), 0);
    assert_eq!(runner.fitness().controller().resets as u64, stats.evaluations);

    assert!(runner.archive().is_covered(1));
    assert!(runner.archive().not_covered_targets().contains(&2));
    assert_eq!(runner.archive().value_of(2), Some(0.5));
    let last_request = runner.fitness().controller().requested_ids.last().unwrap();
    assert!(last_request.contains(&2));

    assert!(solution.overall.does_cover(1));
    assert!(solution.covered_targets() >= 2);
    assert!(!solution.individuals.is_empty());
    assert!(solution.individuals.iter().all(|e| e.individual().size() >= 1));
    // at least one status/endpoint target was reached
    assert!(solution.overall.targets().into_iter().any(IdMapper::is_local));
}

#[test]
fn test_unreachable_sut_never_stops_the_search() {
    init_logging();
    let controller = FakeController {
        fail_reset: true,
        ..FakeController::new()
    };
    let fitness = RestFitness::new(controller, sut_client(), 100).unwrap();
    let sampler = RestSampler::new(templates(), SamplerConfig::default()).unwrap();

    let mut runner = SearchRunner::new(search_config(20), sampler, fitness);
    let solution = runner.search();

    assert_eq!(runner.stats().iterations, 20);
    assert_eq!(
        runner.stats().evaluation_errors.get("SutUnreachableError"),
        Some(&20)
    );
    assert!(runner.archive().is_empty());
    assert_eq!(solution.covered_targets(), 0);
    assert!(solution.individuals.is_empty());
    assert_eq!(runner.fitness().client().request_count(), 0);
}

#[test]
fn test_search_is_reproducible() {
    let run = || {
        let controller = FakeController::reporting(vec![TargetInfoDto::new(1, 1.0)]);
        let fitness = RestFitness::new(controller, sut_client(), 100).unwrap();
        let sampler = RestSampler::new(templates(), SamplerConfig::default()).unwrap();
        let mut runner = SearchRunner::new(search_config(25), sampler, fitness);
        let solution = runner.search();
        let urls: Vec<String> = runner
            .fitness()
            .client()
            .requests
            .borrow()
            .iter()
            .map(|r| r.url.to_string())
            .collect();
        (solution.overall.targets(), urls)
    };
    assert_eq!(run(), run());
}
