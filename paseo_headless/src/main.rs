use clap::{CommandFactory, Parser};
use common::auth::AuthContext;
use common::route_point::RoutePoint;
use common::stats::StatsUpdate;
use dirs::data_local_dir;
use location::LocationSource;
use location::gpsd_source::GpsdLocationSource;
use location::replay_source::ReplayLocationSource;
use recorder::{RecorderConfig, TrackRecorder};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use storage::{FilesSystemStorage, StatsStore, TripStore};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Replay the waypoints of this CSV file instead of reading gpsd.
    #[arg(short = 'f', long)]
    replay_file: Option<String>,
    /// Address of a running gpsd, e.g. 127.0.0.1:2947.
    #[arg(short = 'd', long)]
    gpsd: Option<String>,
    /// Length of the recording in seconds.
    #[arg(short, long, default_value_t = 30)]
    seconds: u64,
    /// Name of the recorded trip.
    #[arg(short, long)]
    name: Option<String>,
    /// Identity the trip is stored under.
    #[arg(short, long, default_value = "local")]
    user: String,
}

fn read_route_points_from_file(file_path: &str) -> Result<Vec<RoutePoint>, ()> {
    let mut rdr = csv::Reader::from_path(file_path).unwrap();
    let mut points = Vec::new();

    for result in rdr.records() {
        let record = result.unwrap();
        let longitude: f64 = f64::from_str(record.get(0).unwrap()).unwrap();
        let latitude: f64 = f64::from_str(record.get(1).unwrap()).unwrap();
        points.push(RoutePoint::new(latitude, longitude, 0));
    }
    debug!("length of route points: {}", points.len());
    Ok(points)
}

async fn get_gpsd_source(address: &str) -> Result<Arc<dyn LocationSource>, ()> {
    match GpsdLocationSource::new(address).await {
        Ok(gpsd) => Ok(Arc::new(gpsd)),
        Err(e) => {
            error!("Failed to connect to gpsd!. Error: {}", e);
            Err(())
        }
    }
}

fn create_replay_source(cli: &Cli) -> Result<Arc<dyn LocationSource>, ()> {
    if let Some(source_file) = &cli.replay_file {
        let points = read_route_points_from_file(source_file).unwrap();
        Ok(Arc::new(
            ReplayLocationSource::new(&points, Duration::from_secs(5)).unwrap(),
        ))
    } else {
        error!("Failed to create the replay source. Error: replay_file not set");
        Cli::command().print_help().unwrap();
        Err(())
    }
}

fn get_storage_dir() -> Result<std::path::PathBuf, ()> {
    let mut storage_dir = data_local_dir().ok_or_else(|| {
        error!("Could not determine local data directory");
    })?;
    storage_dir.push("paseo");
    Ok(storage_dir)
}

#[tokio::main]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let storage_dir = get_storage_dir()?;
    let source: Arc<dyn LocationSource> = if let Some(address) = &cli.gpsd {
        get_gpsd_source(address).await?
    } else if cli.replay_file.is_some() {
        create_replay_source(&cli)?
    } else {
        error!("No location source specified. Use --gpsd or --replay-file");
        Cli::command().print_help().unwrap();
        return Err(());
    };
    let storage = Arc::new(FilesSystemStorage::new(&storage_dir));
    let auth = AuthContext::new(&cli.user);
    let mut recorder = TrackRecorder::new(
        source,
        Arc::clone(&storage) as Arc<dyn TripStore>,
        auth.clone(),
        RecorderConfig::default(),
    );

    info!("Recording a trip for {} seconds...", cli.seconds);
    recorder.start().await.map_err(|e| {
        error!("Failed to start the recording. Error: {e}");
    })?;
    tokio::time::sleep(Duration::from_secs(cli.seconds)).await;
    let trip = recorder.stop(cli.name.as_deref()).await.map_err(|e| {
        error!("Failed to store the recording. Error: {e}");
    })?;
    info!(
        "Stored trip {} \"{}\" with {:.3} km over {} min and {} points",
        trip.id,
        trip.name,
        trip.distance_km,
        trip.duration_min,
        trip.route.len()
    );

    let today = storage.today(&auth).await.map_err(|e| {
        error!("Failed to load the daily stats. Error: {e}");
    })?;
    let update = StatsUpdate {
        distance_km: Some(today.map_or(0.0, |stats| stats.distance_km) + trip.distance_km),
        ..Default::default()
    };
    let stats = storage.upsert_today(&auth, &update).await.map_err(|e| {
        error!("Failed to update the daily stats. Error: {e}");
    })?;
    info!(
        "Daily distance of {} is now {:.3} km",
        stats.date, stats.distance_km
    );

    let infos = storage.trip_infos(&auth).await.map_err(|e| {
        error!("Failed to list the stored trips. Error: {e}");
    })?;
    info!("Stored trips of {}:", cli.user);
    for info in &infos {
        info!(
            "  {} {} with {:.3} km over {} min",
            info.date, info.name, info.distance_km, info.duration_min
        );
    }
    Ok(())
}
