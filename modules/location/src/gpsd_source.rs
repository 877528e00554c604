use crate::feed::PositionFeed;
use crate::{LocationError, LocationSource, LocationSubscription, Permission};
use common::route_point::RoutePoint;
use futures::StreamExt;
use gpsd_proto::{self, Tpv};
use std::{
    io::{self, ErrorKind},
    net::SocketAddr,
    str::FromStr,
    sync::{Arc, Mutex},
};
use tokio::{io::AsyncWriteExt, net::TcpStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error};

/// GPSD daemon based location provider.
///
/// Connects to a running gpsd, enables watch mode and publishes every TPV
/// record that carries a position. When the connection dies the open
/// subscriptions observe the end of their streams; the provider never
/// reconnects on its own.
pub struct GpsdLocationSource {
    feed: Arc<PositionFeed>,
    latest: Arc<Mutex<Option<RoutePoint>>>,
    reader_handle: tokio::task::JoinHandle<()>,
}

impl GpsdLocationSource {
    /// Connects to the gpsd listening on `address`.
    pub async fn new(address: &str) -> Result<Self, LocationError> {
        let address: SocketAddr = match address.parse() {
            Ok(addr) => addr,
            Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e).into()),
        };
        let mut stream = TcpStream::connect(address).await?;
        stream
            .write_all(gpsd_proto::ENABLE_WATCH_CMD.as_bytes())
            .await?;
        let feed = Arc::new(PositionFeed::new());
        let latest = Arc::new(Mutex::new(None));
        let reader_handle = tokio::spawn(gpsd_reader(
            stream,
            Arc::clone(&feed),
            Arc::clone(&latest),
        ));
        Ok(GpsdLocationSource {
            feed,
            latest,
            reader_handle,
        })
    }
}

impl Drop for GpsdLocationSource {
    fn drop(&mut self) {
        self.reader_handle.abort();
        self.feed.close();
    }
}

#[async_trait::async_trait]
impl LocationSource for GpsdLocationSource {
    async fn request_permission(&self) -> Result<Permission, LocationError> {
        // Reaching the daemon is the host system's access gate.
        Ok(Permission::Granted)
    }

    async fn current_position(&self) -> Result<RoutePoint, LocationError> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(LocationError::NoFix)
    }

    async fn subscribe(
        &self,
        min_distance_m: f64,
    ) -> Result<LocationSubscription, LocationError> {
        self.feed.subscribe(min_distance_m)
    }
}

async fn gpsd_reader(
    stream: TcpStream,
    feed: Arc<PositionFeed>,
    latest: Arc<Mutex<Option<RoutePoint>>>,
) {
    let mut framed = Framed::new(stream, LinesCodec::new());
    while let Some(result) = framed.next().await {
        match result {
            Ok(ref line) => {
                if let Ok(tpv) = serde_json::from_str::<Tpv>(line) {
                    process_tpv_msg(&tpv, &feed, &latest);
                }
            }
            Err(e) => {
                error!("GPSD receive error {e:?}");
            }
        }
    }
    debug!("GPSD connection closed, releasing all subscriptions");
    feed.close();
}

fn process_tpv_msg(tpv: &Tpv, feed: &PositionFeed, latest: &Mutex<Option<RoutePoint>>) {
    let Some(lat) = tpv.lat else { return };
    let Some(lon) = tpv.lon else { return };
    let Some(ref time) = tpv.time else { return };
    let Ok(datetime) = chrono::DateTime::<chrono::Utc>::from_str(time) else {
        return;
    };
    let mut point = RoutePoint::new(lat, lon, datetime.timestamp_millis());
    point.speed = tpv.speed.map(f64::from);
    point.altitude = tpv.alt.map(f64::from);
    *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(point.clone());
    feed.publish(&point);
}
