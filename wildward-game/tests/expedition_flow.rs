use wildward_game::{ExpeditionPhase, ExpeditionStatus, World, WorldError};

/// Real milliseconds a plan takes at 1x speed.
fn plan_real_ms(world: &World, plan_id: &str) -> u64 {
    let mins = world.expedition_plans.get(plan_id).unwrap().duration_mins;
    let day_real = world.config.time.day_duration_ms();
    (f64::from(u32::try_from(day_real).unwrap()) * mins / 1_440.0).round() as u64
}

fn setup() -> (World, String) {
    let mut world = World::new(21, 0);
    let id = world.create_player("Scout", 0);
    (world, id)
}

#[test]
fn phases_track_progress_through_a_full_run() {
    let (mut world, id) = setup();
    world.start_expedition(&id, "forest_forage", 0).unwrap();
    let total = plan_real_ms(&world, "forest_forage");

    let checkpoints = [
        (total / 10, ExpeditionPhase::Preparing),
        (total * 3 / 10, ExpeditionPhase::Traveling),
        (total * 6 / 10, ExpeditionPhase::Exploring),
        (total * 85 / 100, ExpeditionPhase::Returning),
    ];
    for (at, expected) in checkpoints {
        world.tick(at);
        let exp = world.expedition_for(&id).unwrap();
        assert_eq!(exp.phase, expected, "at real ms {at}");
        assert_eq!(exp.status, ExpeditionStatus::Active);
    }

    world.tick(total + 1);
    let exp = world.expedition_for(&id).unwrap();
    assert_eq!(exp.status, ExpeditionStatus::Completed);
    assert_eq!(exp.phase, ExpeditionPhase::Completed);
    assert!((exp.progress - 100.0).abs() < f64::EPSILON);

    let player = world.player(&id).unwrap();
    assert!(player.xp >= 30);
    let collected: u32 = exp.collected.values().sum();
    assert!(collected > 0);
    let banked: u32 = exp
        .collected
        .keys()
        .map(|item| player.inventory.quantity_of(item) + player.storage.quantity_of(item))
        .sum();
    assert_eq!(banked, collected);
    assert!(
        player
            .journal
            .iter()
            .any(|e| e == "log.expedition.completed")
    );
}

#[test]
fn pausing_stretches_the_finish_line() {
    let (mut world, id) = setup();
    world.start_expedition(&id, "forest_forage", 0).unwrap();
    let total = plan_real_ms(&world, "forest_forage");
    let pause_at = total / 5;
    let resume_at = pause_at + total / 3;

    world.tick(pause_at);
    world.pause_expedition(&id, pause_at).unwrap();
    world.tick(resume_at);
    let exp = world.expedition_for(&id).unwrap();
    assert_eq!(exp.status, ExpeditionStatus::Paused);
    assert!((exp.progress - 20.0).abs() < 0.5);

    world.resume_expedition(&id, resume_at).unwrap();

    // The original deadline has moved by the pause span.
    world.tick(total + 1);
    assert_eq!(
        world.expedition_for(&id).unwrap().status,
        ExpeditionStatus::Active
    );
    world.tick(total + (resume_at - pause_at) + 1);
    assert_eq!(
        world.expedition_for(&id).unwrap().status,
        ExpeditionStatus::Completed
    );
}

#[test]
fn aborting_forfeits_loot_and_frees_the_slot() {
    let (mut world, id) = setup();
    world.start_expedition(&id, "forest_forage", 0).unwrap();
    let total = plan_real_ms(&world, "forest_forage");

    world.tick(total * 6 / 10);
    let collected: u32 = world
        .expedition_for(&id)
        .unwrap()
        .collected
        .values()
        .sum();
    world.abort_expedition(&id, total * 6 / 10).unwrap();

    let exp = world.expedition_for(&id).unwrap();
    assert_eq!(exp.status, ExpeditionStatus::Failed);
    let player = world.player(&id).unwrap();
    let banked: u32 = exp
        .collected
        .keys()
        .map(|item| player.inventory.quantity_of(item) + player.storage.quantity_of(item))
        .sum();
    assert!(banked <= collected);
    assert!(player.journal.iter().any(|e| e == "log.expedition.failed"));

    // Terminal records do not block a fresh start.
    world
        .start_expedition(&id, "forest_forage", total * 6 / 10)
        .unwrap();
    assert_eq!(
        world.expedition_for(&id).unwrap().status,
        ExpeditionStatus::Active
    );
}

#[test]
fn start_rejects_gates_and_double_booking() {
    let (mut world, id) = setup();
    assert!(matches!(
        world.start_expedition(&id, "frost_hunt", 0),
        Err(WorldError::LevelTooLow { required: 8, .. })
    ));
    assert!(matches!(
        world.start_expedition(&id, "no_such_plan", 0),
        Err(WorldError::UnknownPlan(_))
    ));
    assert!(matches!(
        world.start_expedition("ghost", "forest_forage", 0),
        Err(WorldError::UnknownPlayer(_))
    ));

    world.start_expedition(&id, "forest_forage", 0).unwrap();
    assert!(matches!(
        world.start_expedition(&id, "forest_forage", 0),
        Err(WorldError::ExpeditionAlreadyActive(_))
    ));
    assert!(matches!(
        world.pause_expedition("ghost", 0),
        Err(WorldError::NoExpedition(_))
    ));
}

#[test]
fn faster_clock_finishes_expeditions_sooner() {
    let (mut world, id) = setup();
    world.set_speed(0, 10.0);
    world.start_expedition(&id, "forest_forage", 0).unwrap();
    let total_at_1x = plan_real_ms(&world, "forest_forage");

    world.tick(total_at_1x / 10 + 1);
    assert_eq!(
        world.expedition_for(&id).unwrap().status,
        ExpeditionStatus::Completed
    );
}
