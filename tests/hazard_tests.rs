use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use versus::{ArenaConfig, Hazards, Side, WallKind, WallState, MAX_OPEN_SIDES};

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[test]
fn test_new_hazards_are_hard_with_event_in_range() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(1);
    let hazards = Hazards::new(&config, secs(3.0), &mut rng);
    for side in Side::ALL {
        assert_eq!(hazards.state(side), WallState::Hard);
        assert!(hazards.is_lethal(side));
    }
    let due = hazards.next_event().unwrap();
    assert!(due >= secs(3.0) + config.permeable_min);
    assert!(due <= secs(3.0) + config.permeable_max);
}

#[test]
fn test_activation_waits_for_event() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(2);
    let mut hazards = Hazards::dormant(&config);
    hazards.schedule(Some(secs(5.0)));

    hazards.advance(secs(4.9), &mut rng);
    assert_eq!(hazards.open_count(), 0);

    hazards.advance(secs(5.0), &mut rng);
    assert_eq!(hazards.open_count(), 1);
    let opened = Side::ALL
        .into_iter()
        .find(|&s| hazards.kind(s) == WallKind::Permeable)
        .unwrap();
    assert!(!hazards.is_lethal(opened));
    let next = hazards.next_event().unwrap();
    assert!(next >= secs(5.0) + config.permeable_min && next <= secs(5.0) + config.permeable_max);
}

#[test]
fn test_permeable_expires_then_hardens() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut hazards = Hazards::dormant(&config);
    hazards.force(
        Side::Left,
        WallState::Permeable { since: secs(0.0), duration: secs(6.0) },
    );

    hazards.advance(secs(5.99), &mut rng);
    assert_eq!(hazards.kind(Side::Left), WallKind::Permeable);

    hazards.advance(secs(6.0), &mut rng);
    assert_eq!(hazards.state(Side::Left), WallState::Expiring { since: secs(6.0) });
    assert!(!hazards.is_lethal(Side::Left));

    hazards.advance(secs(7.5), &mut rng);
    assert_eq!(hazards.kind(Side::Left), WallKind::Expiring);

    hazards.advance(secs(8.0), &mut rng);
    assert_eq!(hazards.state(Side::Left), WallState::Hard);
    assert!(hazards.is_lethal(Side::Left));
}

#[test]
fn test_at_most_two_sides_open() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(4);
    let mut hazards = Hazards::dormant(&config);
    hazards.force(Side::Top, WallState::Permeable { since: secs(0.0), duration: secs(100.0) });
    hazards.force(Side::Bottom, WallState::Expiring { since: secs(0.0) });
    hazards.schedule(Some(secs(1.0)));

    hazards.advance(secs(1.0), &mut rng);
    assert_eq!(hazards.open_count(), 2);
    assert_eq!(hazards.kind(Side::Left), WallKind::Hard);
    assert_eq!(hazards.kind(Side::Right), WallKind::Hard);
    // The pending event is kept, not consumed.
    assert_eq!(hazards.next_event(), Some(secs(1.0)));

    // Once the blinking side hardens the event fires.
    hazards.advance(secs(2.5), &mut rng);
    assert_eq!(hazards.open_count(), 2);
    assert_eq!(hazards.kind(Side::Top), WallKind::Permeable);
}

#[test]
fn test_lifecycle_invariant_over_time() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(5);
    let mut hazards = Hazards::new(&config, Duration::ZERO, &mut rng);
    let mut seen_open = false;
    let mut t = Duration::ZERO;
    while t < secs(120.0) {
        hazards.advance(t, &mut rng);
        assert!(hazards.open_count() <= MAX_OPEN_SIDES);
        seen_open |= hazards.open_count() > 0;
        t += Duration::from_millis(100);
    }
    assert!(seen_open);
}

#[test]
fn test_dormant_never_opens() {
    let config = ArenaConfig::default();
    let mut rng = SmallRng::seed_from_u64(6);
    let mut hazards = Hazards::dormant(&config);
    hazards.advance(secs(1_000.0), &mut rng);
    assert_eq!(hazards.open_count(), 0);
    assert_eq!(hazards.next_event(), None);
}

#[test]
fn test_wall_kinds_wire_names() {
    let config = ArenaConfig::default();
    let mut hazards = Hazards::dormant(&config);
    hazards.force(Side::Top, WallState::Permeable { since: secs(0.0), duration: secs(1.0) });
    hazards.force(Side::Right, WallState::Expiring { since: secs(0.0) });
    let json = serde_json::to_value(hazards.kinds()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"top": "green", "bottom": "hard", "left": "hard", "right": "blink"})
    );
}
