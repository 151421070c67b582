//! Profile store integration: upgrades in, currency drops out.

mod common;

use std::sync::Arc;

use roshambo_core::{OpponentSpec, RoomPlan, Side, Sign, SignDamage, TraitKind};
use roshambo_runtime::{
    FileProfileStore, FixedSignProvider, FixedStrategy, ProfileStore, Runtime, keys,
};

#[tokio::test]
async fn upgrades_apply_at_run_start_and_drops_write_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");

    let store = FileProfileStore::open(&path).unwrap();
    store.set(keys::UPGRADE_MAX_HEALTH, 20).unwrap();
    store.set(keys::UPGRADE_BASE_DAMAGE, 2).unwrap();
    let store = Arc::new(store);

    let room = RoomPlan::new([OpponentSpec::new(
        "bandit",
        12,
        SignDamage::uniform(5),
    )
    .with_trait(TraitKind::Bounty { coins: 7, favor: 2 })]);

    let mut runtime = Runtime::builder()
        .first_room(room)
        .player_provider(FixedSignProvider(Sign::Rock))
        .opponent_strategy(FixedStrategy(Sign::Scissors))
        .profile_store(store.clone())
        .run_seed(11)
        .build()
        .await
        .unwrap();
    common::spawn_presentation(&runtime.handle());

    // Permanent upgrades biased the starting player.
    let state = runtime.handle().query_state().await.unwrap();
    assert_eq!(state.player.max_health, 120);
    assert_eq!(state.player.base_damage.rock, 12);

    // One upgraded hit (12 damage) kills the 12-health opponent; the bounty
    // lands in the store immediately.
    let report = runtime.step().await.unwrap();
    assert_eq!(report.dead, Some(Side::Opponent));
    assert_eq!(store.get(keys::COINS).unwrap(), Some(7));
    assert_eq!(store.get(keys::FAVOR).unwrap(), Some(2));

    let state = runtime.handle().query_state().await.unwrap();
    assert_eq!(state.coins_earned, 7);
    assert_eq!(state.favor_earned, 2);

    // The document on disk reflects the drop, not just the in-memory cache.
    let reopened = FileProfileStore::open(&path).unwrap();
    assert_eq!(reopened.get(keys::COINS).unwrap(), Some(7));
    assert_eq!(reopened.get(keys::UPGRADE_MAX_HEALTH).unwrap(), Some(20));
}
