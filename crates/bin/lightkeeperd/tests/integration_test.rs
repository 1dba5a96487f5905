//! End-to-end tests for the full lightkeeperd stack.
//!
//! Each test wires the real snapshot store, the virtual dispatcher and the
//! controller exactly as the daemon does, then drives it with explicit
//! timestamps instead of the wall clock.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use lightkeeper_adapter_storage_json::JsonStore;
use lightkeeper_adapter_virtual::VirtualDispatcher;
use lightkeeper_app::controller::LightController;
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::DeviceId;
use lightkeeper_domain::manual::ManualAction;
use lightkeeper_domain::schedule::{ScheduleAction, ScheduleEvent};
use lightkeeper_domain::time::Timestamp;

type Controller =
    LightController<Arc<JsonStore>, Arc<JsonStore>, Arc<JsonStore>, Arc<VirtualDispatcher>>;

fn wire(store: JsonStore) -> (Controller, Arc<VirtualDispatcher>) {
    let store = Arc::new(store);
    let dispatcher = Arc::new(VirtualDispatcher::new());
    let controller =
        LightController::new(store.clone(), store.clone(), store, dispatcher.clone());
    (controller, dispatcher)
}

fn evening() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

fn at(offset_secs: i64) -> Timestamp {
    evening() + Duration::seconds(offset_secs)
}

fn id(raw: &str) -> DeviceId {
    DeviceId::new(raw).unwrap()
}

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("lightkeeperd-it-{}.json", uuid::Uuid::new_v4()))
}

fn one_hour_on(device: &str) -> ScheduleEvent {
    ScheduleEvent::builder()
        .device_id(id(device))
        .action(ScheduleAction::On)
        .start(evening())
        .end(at(3600))
        .title("Evening")
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Schedule window
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_turn_light_on_inside_scheduled_window() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "Office", at(-60))
        .await
        .unwrap();
    ctl.create_event(one_hour_on("D1"), at(-30)).await.unwrap();

    let report = ctl.tick(at(1800)).await.unwrap();

    assert_eq!(report.active_events.len(), 1);
    assert_eq!(report.switched, vec![(id("D1"), true)]);
    assert!(ctl.device(&id("D1")).await.unwrap().state.is_on);
    assert!(lights.light(&id("D1")).reading().is_on);
}

#[tokio::test]
async fn should_turn_light_off_when_window_closes() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(-60)).await.unwrap();
    ctl.create_event(one_hour_on("D1"), at(10)).await.unwrap();

    let report = ctl.tick(at(3600)).await.unwrap();

    assert!(report.active_events.is_empty());
    assert_eq!(report.switched, vec![(id("D1"), false)]);
    assert!(!lights.light(&id("D1")).reading().is_on);
    assert_eq!(
        ctl.schedule_service().list_completed().await.unwrap().len(),
        1
    );
}

// ---------------------------------------------------------------------------
// Manual override and grace period
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_hold_manual_off_during_grace_then_reassert_schedule() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(-60)).await.unwrap();
    ctl.create_event(one_hour_on("D1"), at(1)).await.unwrap();

    let applied = ctl
        .manual(&id("D1"), ManualAction::Toggle, at(1800))
        .await
        .unwrap();
    assert!(!applied.value.is_on);
    assert!(applied.value.manual_override);
    assert!(!lights.light(&id("D1")).reading().is_on);

    ctl.tick(at(1803)).await.unwrap();
    assert!(!ctl.device(&id("D1")).await.unwrap().state.is_on);

    let report = ctl.tick(at(1806)).await.unwrap();
    assert_eq!(report.switched, vec![(id("D1"), true)]);
    let state = ctl.device(&id("D1")).await.unwrap().state;
    assert!(state.is_on);
    assert!(!state.manual_override);
    assert!(lights.light(&id("D1")).reading().is_on);
}

#[tokio::test]
async fn should_keep_manual_state_after_grace_when_nothing_scheduled() {
    let (ctl, _) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(0)).await.unwrap();

    ctl.manual(&id("D1"), ManualAction::Toggle, at(10))
        .await
        .unwrap();
    ctl.tick(at(600)).await.unwrap();

    assert!(ctl.device(&id("D1")).await.unwrap().state.is_on);
}

#[tokio::test]
async fn should_send_brightness_to_light_and_log_it() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(0)).await.unwrap();

    ctl.manual(&id("D1"), ManualAction::SetBrightness(42), at(10))
        .await
        .unwrap();

    assert_eq!(lights.light(&id("D1")).reading().brightness.value(), 42);
    let recent = ctl.history_service().recent(1).await.unwrap();
    assert_eq!(recent[0].action, "brightness 42%");
}

#[tokio::test]
async fn should_reject_manual_command_when_light_unreachable() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(0)).await.unwrap();
    lights.light(&id("D1")).set_reachable(false);

    let result = ctl.manual(&id("D1"), ManualAction::Toggle, at(10)).await;

    assert!(matches!(result, Err(LightkeeperError::Dispatch(_))));
    let state = ctl.device(&id("D1")).await.unwrap().state;
    assert!(!state.is_on);
    assert!(!state.manual_override);
}

#[tokio::test]
async fn should_bring_light_in_line_once_it_is_reachable_again() {
    let (ctl, lights) = wire(JsonStore::in_memory());
    ctl.add_device(id("D1"), "Desk", "", at(-60)).await.unwrap();
    lights.light(&id("D1")).set_reachable(false);
    let applied = ctl.create_event(one_hour_on("D1"), at(10)).await.unwrap();
    assert_eq!(applied.report.dispatch_failures, vec![id("D1")]);
    assert!(!lights.light(&id("D1")).reading().is_on);

    lights.light(&id("D1")).set_reachable(true);
    let report = ctl.tick(at(15)).await.unwrap();

    assert!(report.dispatch_failures.is_empty());
    assert!(lights.light(&id("D1")).reading().is_on);
    assert!(ctl.tick(at(20)).await.unwrap().dispatched.is_empty());
}

// ---------------------------------------------------------------------------
// Open-ended OFF
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_keep_open_ended_off_active_a_year_later() {
    let (ctl, _) = wire(JsonStore::in_memory());
    ctl.add_device(id("D2"), "Porch", "", at(-60)).await.unwrap();
    ctl.manual(&id("D2"), ManualAction::Toggle, at(-50))
        .await
        .unwrap();
    let off = ScheduleEvent::builder()
        .device_id(id("D2"))
        .action(ScheduleAction::Off)
        .start(evening())
        .build()
        .unwrap();
    ctl.create_event(off.clone(), at(-40)).await.unwrap();

    let report = ctl.tick(at(365 * 24 * 3600)).await.unwrap();

    assert_eq!(report.active_events, vec![off]);
    let state = ctl.device(&id("D2")).await.unwrap().state;
    assert!(!state.is_on);
    assert_eq!(state.last_off_event, Some(evening()));
    assert!(ctl.schedule_service().list_completed().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Device lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_allow_readding_deleted_device_and_keep_history() {
    let (ctl, _) = wire(JsonStore::in_memory());

    ctl.add_device(id("L1"), "Hall", "", at(0)).await.unwrap();
    ctl.remove_device(&id("L1"), at(1)).await.unwrap();
    let readded = ctl.add_device(id("L1"), "Hall", "", at(2)).await.unwrap();

    assert!(!readded.value.state.is_on);
    assert_eq!(readded.value.state.brightness.value(), 50);
    let labels: Vec<_> = ctl
        .history()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(labels, ["added", "deleted", "added"]);
}

#[tokio::test]
async fn should_reject_duplicate_device() {
    let (ctl, _) = wire(JsonStore::in_memory());
    ctl.add_device(id("L1"), "Hall", "", at(0)).await.unwrap();

    let result = ctl.add_device(id("L1"), "Hall", "", at(1)).await;

    assert!(matches!(result, Err(LightkeeperError::Duplicate(_))));
}

#[tokio::test]
async fn should_reject_event_for_unknown_device() {
    let (ctl, _) = wire(JsonStore::in_memory());

    let result = ctl.create_event(one_hour_on("ghost"), at(0)).await;

    assert!(matches!(result, Err(LightkeeperError::NotFound(_))));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_resume_from_snapshot_after_restart() {
    let path = temp_path();
    {
        let (ctl, _) = wire(JsonStore::open(&path).await.unwrap());
        ctl.add_device(id("D1"), "Desk", "Office", at(-60))
            .await
            .unwrap();
        ctl.create_event(one_hour_on("D1"), at(10)).await.unwrap();
    }

    let (ctl, lights) = wire(JsonStore::open(&path).await.unwrap());
    let device = ctl.device(&id("D1")).await.unwrap();
    assert_eq!(device.location, "Office");
    assert!(device.state.is_on);
    assert_eq!(ctl.schedule_service().list_current().await.unwrap().len(), 1);
    assert_eq!(ctl.history().await.unwrap().len(), 1);

    let report = ctl.tick(at(20)).await.unwrap();
    assert!(report.switched.is_empty());
    assert_eq!(report.dispatched, vec![(id("D1"), true)]);
    assert!(lights.light(&id("D1")).reading().is_on);

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn should_write_snapshot_with_original_collection_names() {
    let path = temp_path();
    let (ctl, _) = wire(JsonStore::open(&path).await.unwrap());
    ctl.add_device(id("D1"), "Desk", "", at(0)).await.unwrap();

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    for key in ["lightStates", "currentEvents", "completedEvents", "lightHistory"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["lightStates"]["D1"]["brightness"], 50);

    tokio::fs::remove_file(&path).await.unwrap();
}
