use std::net::SocketAddr;
use std::sync::Arc;

use sawari_api::{app, state::AppState, worker};
use sawari_booking::{ExpirySweeper, LockManager, SettlementService};
use sawari_domain::repository::{
    BookingRepository, LockRepository, SeatInventory, TransactionRepository,
};
use sawari_fare::{FareConfig, FareEngine};
use sawari_store::{
    DbClient, PgBookingRepository, PgLockRepository, PgSeatInventory, PgTransactionRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sawari_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = sawari_store::app_config::Config::load()?;
    tracing::info!("Starting Sawari API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let rules = config.business_rules.clone();
    let fare_config = FareConfig {
        default_gst_percent: rules.default_gst_percent,
        fallback_seat_fare: rules.fallback_seat_fare,
    };

    let inventory: Arc<dyn SeatInventory> = Arc::new(PgSeatInventory::new(db.pool.clone()));
    let locks: Arc<dyn LockRepository> = Arc::new(PgLockRepository::new(db.pool.clone()));
    let transactions: Arc<dyn TransactionRepository> =
        Arc::new(PgTransactionRepository::new(db.pool.clone()));
    let bookings: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::new(db.pool.clone()));

    let lock_manager = Arc::new(LockManager::new(
        inventory.clone(),
        locks.clone(),
        transactions.clone(),
        FareEngine::new(fare_config.clone()),
        rules.lock_ttl_seconds,
    ));
    let settlement = Arc::new(SettlementService::new(
        inventory.clone(),
        locks.clone(),
        transactions.clone(),
        bookings.clone(),
        FareEngine::new(fare_config),
    ));
    let sweeper = Arc::new(ExpirySweeper::new(
        inventory.clone(),
        locks.clone(),
        rules.lock_ttl_seconds,
    ));

    tokio::spawn(worker::start_sweep_worker(
        sweeper.clone(),
        rules.sweep_interval_seconds,
    ));

    let app_state = AppState {
        lock_manager,
        settlement,
        sweeper,
        bookings,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
