mod common;

use std::time::Duration;

use common::{device_source, device_source_with, FakeDevice, FakeInflux, RecordingSink};
use hycube_client::domain::{FieldValue, MeasurementPoint};
use hycube_ingest::{
    pipeline::{Pipeline, PipelineError},
    sinks::InfluxHttpSink,
};
use pretty_assertions::assert_eq;

fn point(series: &str, meter: &str, fields: &[(&str, FieldValue)]) -> MeasurementPoint {
    fields.iter().fold(
        MeasurementPoint::new(series)
            .with_tag("location", "home")
            .with_tag("meter", meter),
        |p, (k, v)| p.with_field(*k, v.clone()),
    )
}

fn f(v: f64) -> FieldValue {
    FieldValue::Float(v)
}

/// The batch produced from the fixture documents, in write order.
fn expected_batch() -> Vec<MeasurementPoint> {
    vec![
        point("frequency", "hycube-grid", &[("total", f(50.01))]),
        point("voltage", "hycube-grid", &[("L1", f(231.2)), ("L2", f(230.8)), ("L3", f(232.0))]),
        point("current", "hycube-grid", &[("L1", f(1.5)), ("L2", f(1.25)), ("L3", f(0.75))]),
        point("activePower", "hycube-grid", &[("total", f(-120.5))]),
        point("voltage", "hycube-inv1", &[("L1", f(230.1)), ("L2", f(229.9)), ("L3", f(230.4))]),
        point("current", "hycube-inv1", &[("L1", f(2.1)), ("L2", f(2.2)), ("L3", f(2.3))]),
        point("activePower", "hycube-inv1", &[("L1", f(480.0)), ("L2", f(505.0)), ("L3", f(530.0))]),
        point("voltage", "hycube-solar", &[("L1", f(412.3))]),
        point("current", "hycube-solar", &[("L1", f(3.4))]),
        point("activePower", "hycube-solar", &[("L1", f(1402.0))]),
        point("voltage", "hycube-solar", &[("L2", f(398.7))]),
        point("current", "hycube-solar", &[("L2", f(2.9))]),
        point("activePower", "hycube-solar", &[("L2", f(1156.0))]),
        point("activePower", "hycube-home", &[("total", f(865.0))]),
        point("activePower", "hycube-meter3", &[("total", f(0.0))]),
        point("soc", "hycube-battery", &[("total", f(76.0))]),
        point("voltage", "hycube-battery", &[("total", f(51.2))]),
        point("current", "hycube-battery", &[("total", f(-10.5))]),
        point("activePower", "hycube-battery", &[("total", f(-537.6))]),
        point("activePower", "hycube-wallbox", &[("total", f(3680.0))]),
        point("power", "hycube-wallbox", &[("total", f(1523.4))]),
        point("connected", "hycube-wallbox", &[("state", FieldValue::Bool(true))]),
    ]
}

#[tokio::test]
async fn one_cycle_writes_the_mapped_batch_once() {
    let device = FakeDevice::default();
    let addr = device.start().await;
    let sink = RecordingSink::default();
    let pipeline = Pipeline::new(device_source(addr), sink.clone(), Duration::from_secs(10));

    let written = pipeline.run_cycle().await.unwrap();

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], expected_batch());
    assert_eq!(written, 22);
    assert_eq!(device.auth_calls(), 1);
    assert_eq!(device.data_calls(), 4);
}

#[tokio::test]
async fn charger_statistics_failure_prevents_any_write() {
    let device = FakeDevice {
        fail_statistics: true,
        ..Default::default()
    };
    let addr = device.start().await;
    let sink = RecordingSink::default();
    let pipeline = Pipeline::new(device_source(addr), sink.clone(), Duration::from_secs(10));

    let err = pipeline.run_cycle().await.unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)), "unexpected error: {err}");
    assert!(err.to_string().contains("/Wallbox/getStatics"));
    assert!(sink.batches().is_empty());
    // The charger state endpoint is never reached.
    assert_eq!(device.data_calls(), 3);
}

#[tokio::test]
async fn undecodable_document_is_a_decode_error() {
    let device = FakeDevice {
        garbage_state: true,
        ..Default::default()
    };
    let addr = device.start().await;
    let sink = RecordingSink::default();
    let pipeline = Pipeline::new(device_source(addr), sink.clone(), Duration::from_secs(10));

    let err = pipeline.run_cycle().await.unwrap_err();

    assert!(matches!(err, PipelineError::Decode(_)), "unexpected error: {err}");
    assert!(sink.batches().is_empty());
}

#[tokio::test]
async fn rejected_credentials_abort_before_any_fetch() {
    let device = FakeDevice::default();
    let addr = device.start().await;
    let sink = RecordingSink::default();
    let pipeline = Pipeline::new(device_source_with(addr, "wrong"), sink.clone(), Duration::from_secs(10));

    let err = pipeline.run_cycle().await.unwrap_err();

    assert!(matches!(err, PipelineError::Auth(_)), "unexpected error: {err}");
    assert_eq!(device.data_calls(), 0);
    assert!(sink.batches().is_empty());
}

#[tokio::test]
async fn unreachable_device_is_an_auth_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = RecordingSink::default();
    let pipeline = Pipeline::new(device_source(addr), sink.clone(), Duration::from_secs(10));

    assert!(matches!(pipeline.run_cycle().await, Err(PipelineError::Auth(_))));
    assert!(sink.batches().is_empty());
}

#[tokio::test]
async fn failed_write_does_not_stop_reauthentication() {
    let device = FakeDevice::default();
    let device_addr = device.start().await;
    let influx = FakeInflux::failing();
    let influx_addr = influx.start().await;

    let sink = InfluxHttpSink::new(
        &format!("http://{influx_addr}"),
        "power",
        None,
        Duration::from_secs(5),
    )
    .unwrap();
    let pipeline = Pipeline::new(device_source(device_addr), sink, Duration::from_millis(20));

    let watched = device.clone();
    let shutdown = async move {
        while watched.auth_calls() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };

    tokio::time::timeout(Duration::from_secs(10), pipeline.run_until(shutdown))
        .await
        .expect("poller stopped cycling after a failed write");

    assert!(device.auth_calls() >= 2);
    assert!(!influx.writes().is_empty());
}
