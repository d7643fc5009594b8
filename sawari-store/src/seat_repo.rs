use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sawari_domain::repository::SeatInventory;
use sawari_domain::{Bus, Deck, Seat, SeatType, StoreError};

pub struct PgSeatInventory {
    pool: PgPool,
}

impl PgSeatInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    bus_id: Uuid,
    journey_date: chrono::NaiveDate,
    label: String,
    seat_type: String,
    deck: String,
    row_pos: i32,
    col_pos: i32,
    base_price: f64,
    discounted_price: Option<f64>,
    ladies_only: bool,
    is_available: bool,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: row.id,
            bus_id: row.bus_id,
            journey_date: row.journey_date,
            label: row.label,
            seat_type: SeatType::parse(&row.seat_type),
            deck: Deck::parse(&row.deck),
            row: row.row_pos,
            col: row.col_pos,
            base_price: row.base_price,
            discounted_price: row.discounted_price,
            ladies_only: row.ladies_only,
            is_available: row.is_available,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    operator_name: String,
    from_city: String,
    to_city: String,
    gst_percent: Option<f64>,
    base_fare: f64,
}

#[async_trait]
impl SeatInventory for PgSeatInventory {
    async fn seats_by_ids(&self, seat_ids: &[Uuid]) -> Result<Vec<Seat>, StoreError> {
        let rows: Vec<SeatRow> = sqlx::query_as(
            r#"
            SELECT id, bus_id, journey_date, label, seat_type, deck,
                   row_pos, col_pos, base_price, discounted_price,
                   ladies_only, is_available
            FROM seats WHERE id = ANY($1)
            "#,
        )
        .bind(seat_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn reserve(&self, seat_ids: &[Uuid]) -> Result<bool, StoreError> {
        // Single conditional update inside a transaction: either every
        // requested seat is flipped, or the whole attempt rolls back and
        // nothing changes.
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE seats SET is_available = FALSE WHERE id = ANY($1) AND is_available = TRUE",
        )
        .bind(seat_ids)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() as usize == seat_ids.len() {
            tx.commit().await?;
            Ok(true)
        } else {
            tx.rollback().await?;
            Ok(false)
        }
    }

    async fn release(&self, seat_ids: &[Uuid]) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE seats SET is_available = TRUE WHERE id = ANY($1) AND is_available = FALSE",
        )
        .bind(seat_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn bus_by_id(&self, bus_id: Uuid) -> Result<Option<Bus>, StoreError> {
        let row: Option<BusRow> = sqlx::query_as(
            "SELECT id, operator_name, from_city, to_city, gst_percent, base_fare FROM buses WHERE id = $1",
        )
        .bind(bus_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Bus {
            id: r.id,
            operator_name: r.operator_name,
            from_city: r.from_city,
            to_city: r.to_city,
            gst_percent: r.gst_percent,
            base_fare: r.base_fare,
        }))
    }
}
