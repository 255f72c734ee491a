use wildward_game::{Season, WeatherKind, World};

/// Real milliseconds per in-game day at 1x speed.
fn day_real_ms(world: &World) -> u64 {
    world.config.time.day_duration_ms()
}

fn hour_real_ms(world: &World) -> u64 {
    day_real_ms(world) / 24
}

#[test]
fn extreme_weather_streaks_stay_bounded() {
    let mut world = World::new(9, 0);
    let day = day_real_ms(&world);
    let limit = world.config.weather.limits.max_extreme_streak;

    let mut streak = 0u32;
    let mut longest = 0u32;
    for elapsed_days in 0..240u64 {
        world.tick(elapsed_days * day + 1);
        if world.weather.today.is_extreme() {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }
    assert!(longest <= limit, "streak {longest} exceeded limit {limit}");
}

#[test]
fn seasons_follow_the_calendar_over_a_year() {
    let world = World::new(3, 0);
    let day = day_real_ms(&world);

    assert_eq!(world.current_time(0).season, Season::Spring);
    assert_eq!(world.current_time(day * 100).season, Season::Summer);
    assert_eq!(world.current_time(day * 200).season, Season::Autumn);
    assert_eq!(world.current_time(day * 300).season, Season::Winter);
    let wrapped = world.current_time(day * 365);
    assert_eq!(wrapped.year, 2);
    assert_eq!(wrapped.season, Season::Spring);
}

#[test]
fn identical_seeds_produce_identical_weather_history() {
    let mut a = World::new(77, 0);
    let mut b = World::new(77, 0);
    let day = day_real_ms(&a);

    let mut history_a = Vec::new();
    let mut history_b = Vec::new();
    for elapsed_days in 0..90u64 {
        a.tick(elapsed_days * day + 1);
        b.tick(elapsed_days * day + 1);
        history_a.push(a.weather.today);
        history_b.push(b.weather.today);
    }
    assert_eq!(history_a, history_b);
    assert!(history_a.iter().any(|kind| *kind != WeatherKind::Clear));
}

#[test]
fn neglected_player_degrades_to_incapacitation() {
    let mut world = World::new(5, 0);
    let id = world.create_player("Ash", 0);
    let hour = hour_real_ms(&world);

    // Two in-game days of neglect, ticked every four hours.
    for step in 1..=12u64 {
        world.tick(step * hour * 4);
    }

    let player = world.player(&id).unwrap();
    assert!(player.is_incapacitated());
    assert!(player.vitals.health <= 0.0);
    assert!(player.journal.iter().any(|e| e == "log.status.dehydrated"));
    assert!(player.journal.iter().any(|e| e == "log.status.starving"));
    assert!(
        player
            .journal
            .iter()
            .any(|e| e == "log.status.incapacitated")
    );
}

#[test]
fn sleeping_slows_decay_and_restores_energy() {
    let mut world = World::new(11, 0);
    let sleeper = world.create_player("Sleeper", 0);
    let waker = world.create_player("Waker", 0);
    world.set_sleeping(&sleeper, true).unwrap();

    world.tick(hour_real_ms(&world) * 4);

    let sleeper = world.player(&sleeper).unwrap();
    let waker = world.player(&waker).unwrap();
    assert!(sleeper.vitals.hunger > waker.vitals.hunger);
    assert!(sleeper.vitals.thirst > waker.vitals.thirst);
    assert!(sleeper.vitals.energy > waker.vitals.energy);
    assert!((sleeper.vitals.energy - 100.0).abs() < 1e-3);
}

#[test]
fn speed_set_alters_derived_hours() {
    let mut world = World::new(1, 0);
    let hour = hour_real_ms(&world);

    let applied = world.set_speed(0, 4.0);
    assert!((applied - 4.0).abs() < f64::EPSILON);
    // One real game-hour slice now spans four derived hours.
    assert_eq!(world.current_time(hour).hour, 4);

    // Out-of-range requests clamp instead of failing.
    let clamped = world.set_speed(hour, 0.0);
    assert!((clamped - world.config.time.min_speed).abs() < f64::EPSILON);
}
