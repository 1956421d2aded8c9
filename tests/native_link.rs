mod common;

use common::FakeHost;
use native_bridge::{native_host_id, LinkStatus, NativeLink, RECONNECT_DELAY};
use serde_json::json;
use std::time::Duration;
use tokio::time::{timeout, Instant};

#[tokio::test(start_paused = true)]
async fn forwards_both_directions_while_connected() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");
    let mut peer = host.peer(0);

    assert!(link.post(json!({"method": "ping", "parameters": []})));
    assert_eq!(
        peer.recv().await,
        Some(json!({"method": "ping", "parameters": []}))
    );

    peer.post_message(json!("from host"));
    assert_eq!(link.recv().await, json!("from host"));
    assert_eq!(link.status(), LinkStatus::Connected);
}

#[tokio::test(start_paused = true)]
async fn reconnects_once_after_fixed_delay() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");
    assert_eq!(host.dial_count(), 1);

    let disconnected_at = Instant::now();
    host.kill(0);

    // Just short of the delay: noticed the drop, no new connection yet.
    let early = timeout(RECONNECT_DELAY - Duration::from_millis(1), link.recv()).await;
    assert!(early.is_err());
    assert_eq!(link.status(), LinkStatus::Reconnecting);
    assert_eq!(host.dial_count(), 1);

    // Past the delay: exactly one new connection.
    let _ = timeout(Duration::from_millis(5), link.recv()).await;
    assert_eq!(link.status(), LinkStatus::Connected);
    assert_eq!(host.dial_count(), 2);
    assert!(host.dials.borrow()[1].at >= disconnected_at + RECONNECT_DELAY);

    // And no more while the new connection stays up.
    let _ = timeout(Duration::from_secs(10), link.recv()).await;
    assert_eq!(host.dial_count(), 2);
    assert_eq!(link.connect_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn retries_forever_with_constant_delay() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");

    for n in 0..5 {
        host.kill(n);
        let _ = timeout(RECONNECT_DELAY * 2, link.recv()).await;
        assert_eq!(host.dial_count(), n + 2);
    }

    let dials = host.dials.borrow();
    for pair in dials.windows(2).skip(1) {
        let gap = pair[1].at - pair[0].at;
        assert!(gap >= RECONNECT_DELAY, "gap {gap:?}");
        assert!(gap <= RECONNECT_DELAY * 2 + Duration::from_millis(1), "gap {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn traffic_during_gap_is_lost() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");
    host.kill(0);

    let _ = timeout(Duration::from_millis(10), link.recv()).await;
    assert_eq!(link.status(), LinkStatus::Reconnecting);
    assert!(!link.post(json!("lost")));

    let _ = timeout(RECONNECT_DELAY, link.recv()).await;
    assert_eq!(link.status(), LinkStatus::Connected);

    let mut peer = host.peer(1);
    assert!(link.post(json!("kept")));
    assert_eq!(peer.recv().await, Some(json!("kept")));
    assert!(peer.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn host_id_is_reused_for_every_connection() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), native_host_id("acme_bridge"));
    host.kill(0);
    let _ = timeout(RECONNECT_DELAY * 2, link.recv()).await;

    let ids: Vec<String> = host.dials.borrow().iter().map(|d| d.host_id.clone()).collect();
    assert_eq!(ids, vec!["acme_host", "acme_host"]);
    assert_eq!(link.host_id(), "acme_host");
}

#[tokio::test(start_paused = true)]
async fn host_that_never_answers_keeps_being_retried() {
    let mut link = NativeLink::start(
        |host_id: &str| native_bridge::Port::disconnected(host_id),
        "missing_host",
    );

    let _ = timeout(RECONNECT_DELAY * 4 + Duration::from_millis(1), link.recv()).await;
    assert_eq!(link.connect_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn write_only_link_recovers_from_a_dead_host() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");
    host.kill(0);

    // The closed port is noticed on the first post and the reconnect scheduled.
    let noticed_at = Instant::now();
    assert!(!link.post(json!("x")));
    assert_eq!(link.status(), LinkStatus::Reconnecting);

    // Still inside the gap.
    tokio::time::sleep(RECONNECT_DELAY - Duration::from_millis(1)).await;
    assert!(!link.post(json!("x")));
    assert_eq!(host.dial_count(), 1);

    // Past the deadline the next post reconnects and goes through.
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(link.post(json!("after")));
    assert_eq!(host.dial_count(), 2);
    assert_eq!(link.connect_count(), 2);
    assert!(host.dials.borrow()[1].at >= noticed_at + RECONNECT_DELAY);

    let mut peer = host.peer(1);
    assert_eq!(peer.recv().await, Some(json!("after")));
    assert!(peer.try_recv().is_none());

    // Later posts keep using the same connection.
    for _ in 0..3 {
        assert!(link.post(json!("more")));
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
    assert_eq!(host.dial_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn recv_after_post_noticed_drop_keeps_the_deadline() {
    let host = FakeHost::default();
    let mut link = NativeLink::start(host.connector(), "acme_host");
    host.kill(0);
    assert!(!link.post(json!("x")));

    let _ = timeout(RECONNECT_DELAY + Duration::from_millis(1), link.recv()).await;
    assert_eq!(host.dial_count(), 2);
    assert_eq!(link.status(), LinkStatus::Connected);
}
