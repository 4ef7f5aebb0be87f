//! # Pooled Simulation Scenarios
//!
//! End-to-end checks through the public API:
//!
//! 1. **Exhaustion**: spawns past capacity are dropped, never grown
//! 2. **Recycling**: entities leaving the playfield free their slot
//! 3. **Handles**: stale handles never touch a reused slot
//! 4. **Determinism**: same seed and deltas give the same entity stream
//!
//! Run with: cargo test -p driftpool --test scenarios

use driftpool::{
    BoundaryRecycler, Bounds, EdgePolicy, Edges, EntityPool, ExhaustionPolicy, ExitRule,
    Simulation, SimulationConfig, SpawnController, SpawnPattern, SpawnState, SpawnTimer, Vec2,
};

// ============================================================================
// HELPERS
// ============================================================================

fn screen() -> Bounds {
    Bounds::from_size(800.0, 600.0)
}

fn falling_obstacles(capacity: usize) -> Simulation {
    let recycler = BoundaryRecycler::recycle(ExitRule::region(screen(), 20.0, Edges::BOTTOM));
    Simulation::new(EntityPool::new(capacity), recycler)
}

fn obstacle_at(x: f64) -> SpawnState {
    SpawnState::new(Vec2::new(x, -20.0), Vec2::new(0.0, 200.0))
}

// ============================================================================
// EXHAUSTION
// ============================================================================

#[test]
fn ninth_spawn_into_pool_of_eight_is_dropped() {
    let mut sim = falling_obstacles(8);

    for i in 0..8 {
        assert!(sim.try_spawn(obstacle_at(f64::from(i) * 50.0)));
    }
    assert!(!sim.try_spawn(obstacle_at(500.0)));

    let stats = sim.stats_snapshot();
    assert_eq!(stats.active_count, 8);
    assert_eq!(stats.capacity, 8);
    assert_eq!(stats.total_spawned, 8);
    assert_eq!(stats.total_dropped, 1);
    assert_eq!(sim.pool().capacity(), 8);
}

#[test]
fn queued_spawns_past_capacity_are_dropped_in_tick() {
    let mut sim = falling_obstacles(3).with_spawner(SpawnController::new(8, 0));
    for i in 0..5 {
        assert!(sim.request_spawn(obstacle_at(f64::from(i) * 10.0)));
    }

    let report = sim.tick(0.016);
    assert_eq!(report.spawned, 3);
    assert_eq!(report.dropped, 2);
    assert_eq!(report.active, 3);
}

#[test]
fn default_queue_holds_one_pool_of_requests() {
    let mut sim = falling_obstacles(3);
    for i in 0..3 {
        assert!(sim.request_spawn(obstacle_at(f64::from(i) * 10.0)));
    }
    assert!(!sim.request_spawn(obstacle_at(30.0)));

    let report = sim.tick(0.016);
    assert_eq!(report.spawned, 3);
    assert_eq!(report.dropped, 1);
}

#[test]
fn oversized_timer_batch_fills_pool_without_panicking() {
    let mut sim = falling_obstacles(5);
    sim.add_timer(SpawnTimer::new(1.0, SpawnPattern::fixed(obstacle_at(400.0))).with_batch(u32::MAX));

    let report = sim.tick(2.0);
    assert_eq!(report.spawned, 5);
    assert_eq!(report.dropped, u32::MAX as usize - 5);
    assert_eq!(report.active, 5);
}

#[test]
fn grow_policy_extends_up_to_ceiling() {
    let pool = EntityPool::with_policy(2, ExhaustionPolicy::Grow { max_capacity: 3 });
    let recycler = BoundaryRecycler::new(EdgePolicy::Unbounded);
    let mut sim = Simulation::new(pool, recycler);

    assert!(sim.try_spawn(SpawnState::default()));
    assert!(sim.try_spawn(SpawnState::default()));
    assert!(sim.try_spawn(SpawnState::default()));
    assert!(!sim.try_spawn(SpawnState::default()));
    assert_eq!(sim.stats_snapshot().capacity, 3);
}

// ============================================================================
// RECYCLING
// ============================================================================

#[test]
fn obstacle_leaving_bottom_is_recycled_on_fourth_tick() {
    let mut sim = falling_obstacles(8);
    assert!(sim.try_spawn(obstacle_at(400.0)));

    // y: 180, 380, 580 are all inside the padded playfield
    for expected_y in [180.0, 380.0, 580.0] {
        let report = sim.tick(1.0);
        assert_eq!(report.recycled, 0);
        assert_eq!(sim.iterate_active().next().unwrap().position.y, expected_y);
    }

    // y = 780 > 600 + 20
    let report = sim.tick(1.0);
    assert_eq!(report.recycled, 1);
    assert_eq!(report.active, 0);
    assert_eq!(sim.pool().free_count(), 8);
    assert_eq!(sim.stats_snapshot().total_recycled, 1);
}

#[test]
fn entity_leaving_unselected_edge_survives() {
    let mut sim = falling_obstacles(4);
    sim.try_spawn(SpawnState::new(Vec2::new(400.0, 300.0), Vec2::new(-1000.0, 0.0)));

    sim.tick(1.0);
    assert_eq!(sim.pool().active_count(), 1);
    assert_eq!(sim.iterate_active().next().unwrap().position.x, -600.0);
}

#[test]
fn custom_exit_rule() {
    fn below_floor(p: Vec2) -> bool {
        p.y > 100.0
    }
    let recycler = BoundaryRecycler::recycle(ExitRule::Custom(below_floor));
    let mut sim = Simulation::new(EntityPool::new(2), recycler);
    sim.try_spawn(SpawnState::new(Vec2::ZERO, Vec2::new(0.0, 60.0)));

    assert_eq!(sim.tick(1.0).recycled, 0);
    assert_eq!(sim.tick(1.0).recycled, 1);
}

#[test]
fn wrapping_asteroid_reappears_on_opposite_edge() {
    let mut sim = Simulation::new(EntityPool::new(4), BoundaryRecycler::wrap(screen(), 0.0));
    sim.try_spawn(SpawnState::new(Vec2::new(10.0, 300.0), Vec2::new(-40.0, 0.0)));

    let report = sim.tick(0.5);
    assert_eq!(report.wrapped, 1);
    assert_eq!(report.recycled, 0);
    assert_eq!(sim.iterate_active().next().unwrap().position, Vec2::new(790.0, 300.0));
    assert_eq!(sim.stats_snapshot().total_wrapped, 1);
}

#[test]
fn particle_expires_after_lifespan() {
    let mut sim = Simulation::new(EntityPool::new(4), BoundaryRecycler::new(EdgePolicy::Unbounded));
    sim.try_spawn(SpawnState::new(Vec2::ZERO, Vec2::new(1.0, 0.0)).with_lifespan(1.0));

    assert_eq!(sim.tick(0.5).expired, 0);
    let report = sim.tick(0.5);
    assert_eq!(report.expired, 1);
    assert_eq!(report.recycled, 0);
    assert_eq!(sim.stats_snapshot().total_expired, 1);
}

// ============================================================================
// HANDLES
// ============================================================================

#[test]
fn double_despawn_is_noop() {
    let mut sim = falling_obstacles(4);
    sim.try_spawn(obstacle_at(0.0));
    let handle = sim.iterate_active().next().unwrap().handle;

    assert!(sim.despawn(handle));
    assert!(!sim.despawn(handle));
    assert_eq!(sim.pool().active_count(), 0);
    assert_eq!(sim.pool().free_count(), 4);
}

#[test]
fn stale_handle_does_not_touch_reused_slot() {
    let mut sim = falling_obstacles(1);
    sim.try_spawn(obstacle_at(0.0));
    let old = sim.iterate_active().next().unwrap().handle;
    sim.despawn(old);

    sim.try_spawn(obstacle_at(100.0));
    let new = sim.iterate_active().next().unwrap().handle;
    assert_eq!(old.slot(), new.slot());
    assert_ne!(old, new);

    assert!(!sim.despawn(old));
    assert_eq!(sim.pool().active_count(), 1);
    assert!(sim.pool().get(old).is_none());
    assert_eq!(sim.pool().get(new).unwrap().position.x, 100.0);
}

#[test]
fn active_entities_never_share_a_slot() {
    let mut sim = falling_obstacles(16);
    sim.add_timer(SpawnTimer::new(0.25, SpawnPattern::fixed(obstacle_at(400.0))).with_batch(3));

    for _ in 0..200 {
        sim.tick(0.125);
        let mut slots: Vec<usize> = sim.iterate_active().map(|e| e.handle.slot()).collect();
        let count = slots.len();
        slots.dedup();
        assert_eq!(slots.len(), count);
        assert_eq!(count, sim.pool().active_count());
        assert_eq!(sim.pool().active_count() + sim.pool().free_count(), 16);
    }
}

#[test]
fn reacquired_slot_starts_from_neutral_state() {
    let mut sim = Simulation::new(EntityPool::new(1), BoundaryRecycler::new(EdgePolicy::Unbounded));
    sim.try_spawn(
        SpawnState::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)).with_angular_velocity(3.0),
    );
    sim.tick(1.0);
    let handle = sim.iterate_active().next().unwrap().handle;
    sim.despawn(handle);

    sim.try_spawn(SpawnState::new(Vec2::new(1.0, 2.0), Vec2::ZERO));
    let entity = sim.iterate_active().next().unwrap();
    assert_eq!(entity.position, Vec2::new(1.0, 2.0));
    assert_eq!(entity.velocity, Vec2::ZERO);
    assert_eq!(entity.angular_velocity, 0.0);
    assert_eq!(entity.rotation, 0.0);
    assert_eq!(entity.age, 0.0);
}

// ============================================================================
// DETERMINISM
// ============================================================================

fn jittered_run(seed: u64) -> Vec<Vec2> {
    let pattern = SpawnPattern::fixed(obstacle_at(400.0)).with_position_jitter(380.0, 0.0);
    let mut spawner = SpawnController::new(32, seed);
    spawner.add_timer(SpawnTimer::new(0.5, pattern).with_batch(2));
    let mut sim = falling_obstacles(32).with_spawner(spawner);

    for _ in 0..32 {
        sim.tick(0.125);
    }
    sim.iterate_active().map(|e| e.position).collect()
}

#[test]
fn same_seed_same_stream() {
    let first = jittered_run(7);
    assert!(!first.is_empty());
    assert_eq!(first, jittered_run(7));
    assert_ne!(first, jittered_run(8));
}

// ============================================================================
// CONFIG AND RENDER PATH
// ============================================================================

#[test]
fn config_builds_running_scene() {
    let mut sim = SimulationConfig::from_toml_str(
        r#"
        [pool]
        capacity = 30

        [boundary]
        policy = "recycle"
        margin = 20.0
        edges = { bottom = true }

        [spawn]
        seed = 99

        [[spawn.timers]]
        interval = 1.0
        repeat = 2
        x = 400.0
        y = -20.0
        vy = 200.0
        "#,
    )
    .unwrap()
    .build()
    .unwrap();

    let spawned: usize = (0..10).map(|_| sim.tick(1.0).spawned).sum();
    assert_eq!(spawned, 2);
    assert_eq!(sim.stats_snapshot().total_recycled, 2);
    assert_eq!(sim.pool().active_count(), 0);
}

#[test]
fn packed_positions_are_castable_back() {
    let mut sim = falling_obstacles(4);
    sim.try_spawn(obstacle_at(1.0));
    sim.try_spawn(obstacle_at(2.0));

    let mut buf = Vec::new();
    let bytes = sim.pool().pack_active_positions(&mut buf).to_vec();
    assert_eq!(bytes.len(), 2 * std::mem::size_of::<Vec2>());

    let (first, second) = bytes.split_at(std::mem::size_of::<Vec2>());
    assert_eq!(first, bytemuck::bytes_of(&Vec2::new(1.0, -20.0)));
    assert_eq!(second, bytemuck::bytes_of(&Vec2::new(2.0, -20.0)));
}
