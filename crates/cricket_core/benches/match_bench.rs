use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cricket_core::engine::ball::BallPhysicsEngine;
use cricket_core::engine::timestep::HEADLESS_FRAME_DT;
use cricket_core::{simulate_match, Delivery, DeliveryType, EngineConfig, MatchMode, MatchOptions, SimulationRequest};

fn bench_delivery_flight(c: &mut Criterion) {
    let cfg = EngineConfig::default();
    c.bench_function("delivery_flight", |b| {
        let mut engine = BallPhysicsEngine::new(cfg.physics.clone(), 7);
        b.iter(|| {
            engine.reset();
            engine.start_delivery(&Delivery::nominal(DeliveryType::Straight)).unwrap();
            while engine.state().is_moving {
                engine.tick(HEADLESS_FRAME_DT);
                black_box(engine.take_events());
            }
        })
    });
}

fn bench_two_over_match(c: &mut Criterion) {
    let request = SimulationRequest {
        schema_version: 1,
        mode: MatchMode::FreePlay,
        options: MatchOptions { seed: 42, overs: Some(2), ..MatchOptions::default() },
        profile: None,
        config: None,
        aggression: 0.6,
        timing_sigma_m: 0.6,
        max_seconds: 36_000.0,
    };
    c.bench_function("two_over_match", |b| b.iter(|| simulate_match(black_box(&request)).unwrap()));
}

criterion_group!(benches, bench_delivery_flight, bench_two_over_match);
criterion_main!(benches);
