// CLASSIFICATION: COMMUNITY
// Filename: transition_log.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-29

//! Tests of the fixed-capacity transition log and its wrap-safe timestamps.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use netsock::trace::transitions::THREAD_NAME_CAPACITY;
use netsock::trace::{TcpPcb, TcpState, TickSource, TransitionLog};

/// Tick source whose reading is set explicitly by the test.
#[derive(Clone, Default)]
struct ManualTicks(Arc<AtomicU32>);

impl ManualTicks {
    fn set(&self, value: u32) {
        self.0.store(value, Ordering::SeqCst);
    }
}

impl TickSource for ManualTicks {
    fn low_order_ticks(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

fn pcb() -> TcpPcb {
    TcpPcb {
        local_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
        remote_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
        local_port: 49152,
        remote_port: 443,
        state: TcpState::Closed,
    }
}

#[test]
fn recorder_sets_the_control_block_state() {
    let log = TransitionLog::with_capacity(4, ManualTicks::default());
    let mut block = pcb();
    log.record_transition(&mut block, TcpState::SynSent);
    assert_eq!(block.state, TcpState::SynSent);
    log.record_transition(&mut block, TcpState::Established);
    assert_eq!(block.state, TcpState::Established);
    assert_eq!(log.len(), 2);
}

#[test]
fn saturates_without_evicting() {
    let _ = env_logger::builder().is_test(true).try_init();
    let log = TransitionLog::with_capacity(3, ManualTicks::default());
    let mut block = pcb();
    let states = [
        TcpState::SynSent,
        TcpState::Established,
        TcpState::FinWait1,
        TcpState::FinWait2,
        TcpState::TimeWait,
    ];
    for state in states {
        log.record_transition(&mut block, state);
    }

    assert_eq!(log.len(), log.capacity());
    assert_eq!(log.len(), 3);
    assert_eq!(log.saturated_drops(), 2);
    // Dropped entries still moved the control block.
    assert_eq!(block.state, TcpState::TimeWait);

    // The retained entries are the oldest three, in insertion order.
    let snapshot = log.snapshot();
    let recorded: Vec<TcpState> = snapshot.iter().map(|e| e.state).collect();
    assert_eq!(
        recorded,
        vec![TcpState::SynSent, TcpState::Established, TcpState::FinWait1]
    );
}

#[test]
fn clear_then_append_yields_one_retrievable_entry() {
    let log = TransitionLog::with_capacity(2, ManualTicks::default());
    let mut block = pcb();
    log.record_transition(&mut block, TcpState::SynSent);
    log.record_transition(&mut block, TcpState::Established);
    assert_eq!(log.len(), 2);

    log.clear();
    assert_eq!(log.len(), 0);
    assert!(log.is_empty());
    assert_eq!(log.capacity(), 2);

    log.record_transition(&mut block, TcpState::FinWait1);
    assert_eq!(log.len(), 1);
    assert_eq!(log.snapshot()[0].state, TcpState::FinWait1);
}

#[test]
fn timestamps_stay_monotonic_across_a_tick_wrap() {
    let ticks = ManualTicks::default();
    let log = TransitionLog::with_capacity(8, ticks.clone());
    let mut block = pcb();

    ticks.set(u32::MAX - 1);
    log.record_transition(&mut block, TcpState::SynSent);
    ticks.set(5);
    log.record_transition(&mut block, TcpState::Established);

    let snapshot = log.snapshot();
    assert!(snapshot[1].timestamp > snapshot[0].timestamp);
    // The low-order residual matches the latest raw reading.
    assert_eq!(snapshot[1].timestamp & 0xFFFF_FFFF, 5);
    assert_eq!(snapshot[1].timestamp >> 32, 1);
}

#[test]
fn entries_capture_identity_and_reporting_thread() {
    let log = Arc::new(TransitionLog::with_capacity(4, ManualTicks::default()));

    let reporter = Arc::clone(&log);
    thread::Builder::new()
        .name("pcb-reporter".into())
        .spawn(move || {
            let mut block = pcb();
            reporter.record_transition(&mut block, TcpState::Established);
        })
        .unwrap()
        .join()
        .unwrap();

    let snapshot = log.snapshot();
    assert_eq!(snapshot.len(), 1);
    let event = &snapshot[0];
    assert_eq!(event.local_port, 49152);
    assert_eq!(event.remote_port, 443);
    assert_eq!(event.state, TcpState::Established);
    assert_eq!(event.thread, "pcb-reporter");
}

#[test]
fn long_thread_names_are_truncated() {
    let log = Arc::new(TransitionLog::with_capacity(2, ManualTicks::default()));
    let name = "a-rather-long-reporting-thread-name-indeed";
    assert!(name.len() > THREAD_NAME_CAPACITY);

    let reporter = Arc::clone(&log);
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut block = pcb();
            reporter.record_transition(&mut block, TcpState::Listen);
        })
        .unwrap()
        .join()
        .unwrap();

    let recorded = &log.snapshot()[0].thread;
    assert_eq!(recorded.len(), THREAD_NAME_CAPACITY);
    assert!(name.starts_with(recorded.as_str()));
}

#[test]
fn concurrent_reporters_never_exceed_capacity() {
    let log = Arc::new(TransitionLog::with_capacity(16, ManualTicks::default()));
    let mut handles = Vec::new();
    for _ in 0..4 {
        let reporter = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            let mut block = pcb();
            for _ in 0..8 {
                reporter.record_transition(&mut block, TcpState::Established);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), 16);
    assert_eq!(log.saturated_drops(), 16);
}

#[test]
fn events_render_as_json_lines() {
    let log = TransitionLog::with_capacity(2, ManualTicks::default());
    let mut block = pcb();
    log.record_transition(&mut block, TcpState::Established);

    let line = log.snapshot()[0].to_json_line();
    assert!(line.contains("\"state\":\"established\""));
    assert!(line.contains("\"local_port\":49152"));
    assert!(line.contains("\"remote_addr\":\"192.168.1.20\""));
}
