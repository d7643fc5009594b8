use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_domain::repository::BookingRepository;
use sawari_domain::{Booking, BookingStatus, StoreError};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    pnr: String,
    booking_group_id: Uuid,
    transaction_id: Uuid,
    bus_id: Uuid,
    operator_name: String,
    from_city: String,
    to_city: String,
    journey_date: NaiveDate,
    boarding_point: String,
    dropping_point: String,
    seat_labels: Vec<String>,
    passenger_names: Vec<String>,
    base_fare: f64,
    gst: f64,
    discount: f64,
    total: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            pnr: row.pnr,
            booking_group_id: row.booking_group_id,
            transaction_id: row.transaction_id,
            bus_id: row.bus_id,
            operator_name: row.operator_name,
            from_city: row.from_city,
            to_city: row.to_city,
            journey_date: row.journey_date,
            boarding_point: row.boarding_point,
            dropping_point: row.dropping_point,
            seat_labels: row.seat_labels,
            passenger_names: row.passenger_names,
            base_fare: row.base_fare,
            gst: row.gst,
            discount: row.discount,
            total: row.total,
            status: BookingStatus::parse(&row.status),
            created_at: row.created_at,
        }
    }
}

const SELECT_BOOKING: &str = r#"
    SELECT id, pnr, booking_group_id, transaction_id, bus_id, operator_name,
           from_city, to_city, journey_date, boarding_point, dropping_point,
           seat_labels, passenger_names, base_fare, gst, discount, total,
           status, created_at
    FROM bookings
"#;

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, pnr, booking_group_id, transaction_id, bus_id,
                 operator_name, from_city, to_city, journey_date,
                 boarding_point, dropping_point, seat_labels,
                 passenger_names, base_fare, gst, discount, total,
                 status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.pnr)
        .bind(booking.booking_group_id)
        .bind(booking.transaction_id)
        .bind(booking.bus_id)
        .bind(&booking.operator_name)
        .bind(&booking.from_city)
        .bind(&booking.to_city)
        .bind(booking.journey_date)
        .bind(&booking.boarding_point)
        .bind(&booking.dropping_point)
        .bind(&booking.seat_labels)
        .bind(&booking.passenger_names)
        .bind(booking.base_fare)
        .bind(booking.gst)
        .bind(booking.discount)
        .bind(booking.total)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("{SELECT_BOOKING} WHERE pnr = $1"))
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Booking::from))
    }

    async fn pnr_exists(&self, pnr: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1::BIGINT FROM bookings WHERE pnr = $1")
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }
}
