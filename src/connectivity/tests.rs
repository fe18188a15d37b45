//! Tests for the connectivity module

use super::*;
use std::time::Duration;

#[test]
fn test_monitor_transitions() {
    let mut monitor = ConnectivityMonitor::new(true);
    assert!(monitor.is_online());

    assert_eq!(monitor.signal(false), Transition::Offline);
    assert!(!monitor.is_online());

    assert_eq!(monitor.signal(true), Transition::Online);
    assert!(monitor.is_online());
}

#[test]
fn test_monitor_idempotent() {
    let mut monitor = ConnectivityMonitor::default();
    assert_eq!(monitor.signal(true), Transition::Unchanged);

    monitor.signal(false);
    assert_eq!(monitor.signal(false), Transition::Unchanged);
    assert!(!monitor.is_online());
}

#[test]
fn test_probe_for_url() {
    let probe = TcpProbe::for_url("https://picsum.photos/v2/list", Duration::from_secs(5)).unwrap();
    assert_eq!(probe.addr(), "picsum.photos:443");

    let probe = TcpProbe::for_url("http://127.0.0.1:9000", Duration::from_secs(5)).unwrap();
    assert_eq!(probe.addr(), "127.0.0.1:9000");

    assert!(TcpProbe::for_url("not a url", Duration::from_secs(5)).is_err());
}

#[tokio::test]
async fn test_probe_check() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(1));
    assert!(probe.check().await);

    drop(listener);
    let probe = probe.with_timeout(Duration::from_millis(200));
    assert!(!probe.check().await);
}
