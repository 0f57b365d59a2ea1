use std::thread;
use std::time::Duration;

use rafsim::{GenerateRequest, PoolKind, RuntimeConfig, SimEngine, SimRuntime};

fn request(saturation: i64, runs: i64, seed: u64) -> GenerateRequest {
    GenerateRequest::builder()
        .simulator_id("raf")
        .saturation(saturation)
        .runs(runs)
        .macro_param("seed", seed)
        .extra("first_hit_stats")
        .build()
        .unwrap()
}

fn runtime() -> SimRuntime {
    SimRuntime::new(
        SimEngine::with_builtin(),
        &RuntimeConfig {
            light_workers: 2,
            heavy_workers: 1,
            queue_capacity: 32,
            heavy_threshold: 200,
        },
    )
    .unwrap()
}

#[test]
fn runtime_matches_direct_engine_execution() {
    let runtime = runtime();
    let req = request(20, 3, 11);
    let via_runtime = runtime.generate(&req).unwrap();
    let direct = SimEngine::with_builtin().generate(&req).unwrap();
    assert_eq!(via_runtime.entries, direct.entries);
    assert_eq!(via_runtime.request_id, req.request_id);
}

#[test]
fn requests_are_routed_by_cost() {
    let runtime = runtime();
    let light = runtime.submit(&request(10, 2, 1)).unwrap();
    let heavy = runtime.submit(&request(100, 4, 1)).unwrap();
    assert_eq!(light.pool(), PoolKind::Light);
    assert_eq!(heavy.pool(), PoolKind::Heavy);
    assert_eq!(light.join().unwrap().entries[0].saturation, 10);
    assert_eq!(heavy.join_timeout(Duration::from_secs(30)).unwrap().entries[0].saturation, 100);
}

#[test]
fn concurrent_submitters_get_their_own_responses() {
    let runtime = runtime();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..6u64)
            .map(|seed| {
                let runtime = &runtime;
                scope.spawn(move || {
                    let req = request(15, 2, seed);
                    let response = runtime.generate(&req).unwrap();
                    (req.request_id, response)
                })
            })
            .collect();
        for handle in handles {
            let (id, response) = handle.join().unwrap();
            assert_eq!(response.request_id, id);
            assert!(response.errors.is_empty());
        }
    });
}

#[test]
fn engine_failures_come_back_through_the_handle() {
    let runtime = runtime();
    let req = GenerateRequest::builder()
        .simulator_id("missing")
        .saturation(10)
        .runs(1)
        .build()
        .unwrap();
    let err = runtime.submit(&req).unwrap().join().unwrap_err();
    assert_eq!(err.kind(), "unknown_simulator");
}
