//! Poller tests against a real clock and thread.
//!
//! Windows are shortened to milliseconds; every wait is bounded.

#![cfg(feature = "std")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rs_sentinel::hal::{MockDisplay, MockMotionSensor, MockNotifier, MonotonicClock};
use rs_sentinel::{
    AlarmControl, AlarmState, AlarmStateMachine, AlarmTiming, Clock, Poller, SharedAlarmState,
    MSG_ALARM_TRIGGERED, MSG_PERSON_DETECTED,
};

type RealAlarm = SharedAlarmState<MonotonicClock, MockNotifier>;

fn alarm(countdown_ms: u64, cooldown_ms: u64) -> (Arc<RealAlarm>, MockNotifier) {
    let clock = MonotonicClock::new();
    let timing = AlarmTiming {
        countdown_ms,
        cooldown_ms,
    };
    let machine = AlarmStateMachine::with_timing(timing, clock.now_ms());
    let notifier = MockNotifier::new();
    (
        Arc::new(SharedAlarmState::new(machine, clock, notifier.clone())),
        notifier,
    )
}

fn wait_for(alarm: &RealAlarm, state: AlarmState) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if alarm.status().state == state {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn test_poller_raises_alarm_after_countdown() {
    let (state, notifier) = alarm(20, 60_000);
    let mut sensor = MockMotionSensor::new();
    sensor.set_motion(true);

    let stop = Arc::new(AtomicBool::new(false));
    let handle = Poller::new(Arc::clone(&state), sensor, MockDisplay::new())
        .with_interval(Duration::from_millis(1))
        .spawn(Arc::clone(&stop))
        .unwrap();

    assert!(wait_for(&state, AlarmState::AlarmTriggered));
    stop.store(true, Ordering::SeqCst);
    assert!(handle.join().unwrap().is_ok());

    assert_eq!(
        notifier.messages(),
        vec![MSG_PERSON_DETECTED, MSG_ALARM_TRIGGERED]
    );
}

#[test]
fn test_disarm_while_polling_holds() {
    let (state, notifier) = alarm(60_000, 60_000);
    let mut sensor = MockMotionSensor::new();
    sensor.set_motion(true);

    let stop = Arc::new(AtomicBool::new(false));
    let handle = Poller::new(Arc::clone(&state), sensor, MockDisplay::new())
        .with_interval(Duration::from_millis(1))
        .spawn(Arc::clone(&stop))
        .unwrap();

    assert!(wait_for(&state, AlarmState::CountdownActive));

    // Through the trait object, as the HTTP layer does
    let control: Arc<dyn AlarmControl> = state.clone();
    assert!(control.disarm("4321", "4321").is_ok());

    // Continuous motion must not re-arm
    thread::sleep(Duration::from_millis(20));
    assert_eq!(state.status().state, AlarmState::Disarmed);

    stop.store(true, Ordering::SeqCst);
    assert!(handle.join().unwrap().is_ok());
    assert_eq!(notifier.count(MSG_ALARM_TRIGGERED), 0);
}

#[test]
fn test_disarmed_system_rearms_after_cooldown() {
    let (state, notifier) = alarm(60_000, 30);
    state.disarm("4321", "4321").unwrap();

    let mut sensor = MockMotionSensor::new();
    sensor.set_motion(true);

    let stop = Arc::new(AtomicBool::new(false));
    let handle = Poller::new(Arc::clone(&state), sensor, MockDisplay::new())
        .with_interval(Duration::from_millis(1))
        .spawn(Arc::clone(&stop))
        .unwrap();

    assert!(wait_for(&state, AlarmState::CountdownActive));
    stop.store(true, Ordering::SeqCst);
    assert!(handle.join().unwrap().is_ok());
    assert_eq!(notifier.count(MSG_PERSON_DETECTED), 1);
}

#[test]
fn test_sensor_failure_ends_poller_thread() {
    let (state, _notifier) = alarm(60_000, 60_000);
    let mut sensor = MockMotionSensor::new();
    sensor.queue_reading(false);
    sensor.fail_next_read();

    let stop = Arc::new(AtomicBool::new(false));
    let handle = Poller::new(Arc::clone(&state), sensor, MockDisplay::new())
        .with_interval(Duration::from_millis(1))
        .spawn(stop)
        .unwrap();

    assert!(handle.join().unwrap().is_err());
    assert_eq!(state.status().state, AlarmState::Idle);
}
