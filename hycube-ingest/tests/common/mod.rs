#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use hycube_client::{device::basic_credentials, domain::MeasurementPoint, DeviceClient, DeviceConfig};
use hycube_ingest::{
    pipeline::{Envelope, PipelineError, Sink},
    sources::HycubeSource,
};
use tokio::net::TcpListener;

pub const TOKEN: &str = "c0ffee-7a1b";

pub const VALUES_JSON: &str = include_str!("../fixtures/get_values.json");
pub const RAW_JSON: &str = include_str!("../fixtures/actual_values.json");
pub const STATISTICS_JSON: &str = include_str!("../fixtures/wallbox_statics.json");
pub const STATE_JSON: &str = include_str!("../fixtures/wallbox_check.json");

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    addr
}

#[derive(Clone, Default)]
pub struct FakeDevice {
    pub auth_calls: Arc<AtomicUsize>,
    pub data_calls: Arc<AtomicUsize>,
    pub fail_statistics: bool,
    pub garbage_state: bool,
}

impl FakeDevice {
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    pub async fn start(&self) -> SocketAddr {
        let app = Router::new()
            .route("/auth/", get(auth))
            .route("/get_values/", get(values))
            .route("/actual_values/", get(raw_registers))
            .route("/Wallbox/getStatics", get(charger_statistics))
            .route("/Wallbox/checkWallbox", get(charger_state))
            .with_state(self.clone());
        serve(app).await
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some(TOKEN) => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

async fn auth(State(device): State<FakeDevice>, headers: HeaderMap) -> Result<String, StatusCode> {
    device.auth_calls.fetch_add(1, Ordering::SeqCst);
    let expected = basic_credentials("hycube", "hycube");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(v) if v == expected => Ok(format!("{TOKEN}\n")),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn values(State(device): State<FakeDevice>, headers: HeaderMap) -> Result<&'static str, StatusCode> {
    device.authorize(&headers)?;
    Ok(VALUES_JSON)
}

async fn raw_registers(
    State(device): State<FakeDevice>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<&'static str, StatusCode> {
    device.authorize(&headers)?;
    if query.get("values").map(String::as_str) != Some("258") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(RAW_JSON)
}

async fn charger_statistics(
    State(device): State<FakeDevice>,
    headers: HeaderMap,
) -> Result<&'static str, StatusCode> {
    device.authorize(&headers)?;
    if device.fail_statistics {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(STATISTICS_JSON)
}

async fn charger_state(State(device): State<FakeDevice>, headers: HeaderMap) -> Result<&'static str, StatusCode> {
    device.authorize(&headers)?;
    if device.garbage_state {
        return Ok("<html>wallbox offline</html>");
    }
    Ok(STATE_JSON)
}

#[derive(Clone)]
pub struct FakeInflux {
    pub writes: Arc<Mutex<Vec<(HashMap<String, String>, String)>>>,
    pub status: StatusCode,
}

impl FakeInflux {
    pub fn accepting() -> Self {
        Self {
            writes: Arc::default(),
            status: StatusCode::NO_CONTENT,
        }
    }

    pub fn failing() -> Self {
        Self {
            writes: Arc::default(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn writes(&self) -> Vec<(HashMap<String, String>, String)> {
        self.writes.lock().unwrap().clone()
    }

    pub async fn start(&self) -> SocketAddr {
        let app = Router::new()
            .route("/write", post(influx_write))
            .with_state(self.clone());
        serve(app).await
    }
}

async fn influx_write(
    State(influx): State<FakeInflux>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> (StatusCode, &'static str) {
    influx.writes.lock().unwrap().push((query, body));
    if influx.status.is_success() {
        (influx.status, "")
    } else {
        (influx.status, "{\"error\":\"engine: database is closed\"}")
    }
}

/// Keeps every batch it is handed.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub batches: Arc<Mutex<Vec<Vec<MeasurementPoint>>>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Vec<MeasurementPoint>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sink for RecordingSink {
    async fn write(&self, batch: &Envelope<Vec<MeasurementPoint>>) -> Result<usize, PipelineError> {
        self.batches.lock().unwrap().push(batch.payload.clone());
        Ok(batch.payload.len())
    }
}

pub fn device_source(addr: SocketAddr) -> HycubeSource {
    device_source_with(addr, "hycube")
}

pub fn device_source_with(addr: SocketAddr, password: &str) -> HycubeSource {
    let client = DeviceClient::new(&DeviceConfig {
        base_url: format!("http://{addr}"),
        password: password.to_string(),
        request_timeout: Duration::from_secs(5),
        ..DeviceConfig::default()
    })
    .unwrap();
    HycubeSource::new(client)
}
