use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_domain::repository::LockRepository;
use sawari_domain::{LockStatus, SeatLock, StoreError};

pub struct PgLockRepository {
    pool: PgPool,
}

impl PgLockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LockRow {
    id: Uuid,
    booking_group_id: Uuid,
    seat_id: Uuid,
    seat_label: String,
    passenger_name: String,
    passenger_age: i32,
    passenger_gender: String,
    boarding_point: String,
    dropping_point: String,
    fare: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<LockRow> for SeatLock {
    fn from(row: LockRow) -> Self {
        SeatLock {
            id: row.id,
            booking_group_id: row.booking_group_id,
            seat_id: row.seat_id,
            seat_label: row.seat_label,
            passenger_name: row.passenger_name,
            passenger_age: row.passenger_age,
            passenger_gender: row.passenger_gender,
            boarding_point: row.boarding_point,
            dropping_point: row.dropping_point,
            fare: row.fare,
            status: LockStatus::parse(&row.status),
            created_at: row.created_at,
        }
    }
}

const SELECT_LOCK: &str = r#"
    SELECT id, booking_group_id, seat_id, seat_label, passenger_name,
           passenger_age, passenger_gender, boarding_point, dropping_point,
           fare, status, created_at
    FROM booking_seats
"#;

#[async_trait]
impl LockRepository for PgLockRepository {
    async fn insert_locks(&self, locks: &[SeatLock]) -> Result<(), StoreError> {
        // All rows of the group land in one transaction; a partial insert
        // rolls back, leaving no orphaned lock rows behind.
        let mut tx = self.pool.begin().await?;

        for lock in locks {
            sqlx::query(
                r#"
                INSERT INTO booking_seats
                    (id, booking_group_id, seat_id, seat_label, passenger_name,
                     passenger_age, passenger_gender, boarding_point,
                     dropping_point, fare, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(lock.id)
            .bind(lock.booking_group_id)
            .bind(lock.seat_id)
            .bind(&lock.seat_label)
            .bind(&lock.passenger_name)
            .bind(lock.passenger_age)
            .bind(&lock.passenger_gender)
            .bind(&lock.boarding_point)
            .bind(&lock.dropping_point)
            .bind(lock.fare)
            .bind(lock.status.as_str())
            .bind(lock.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn locks_for_group(&self, booking_group_id: Uuid) -> Result<Vec<SeatLock>, StoreError> {
        let rows: Vec<LockRow> =
            sqlx::query_as(&format!("{SELECT_LOCK} WHERE booking_group_id = $1 ORDER BY created_at"))
                .bind(booking_group_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(SeatLock::from).collect())
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<SeatLock>, StoreError> {
        let rows: Vec<LockRow> =
            sqlx::query_as(&format!("{SELECT_LOCK} WHERE status = 'LOCKED' AND created_at < $1"))
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(SeatLock::from).collect())
    }

    async fn promote_group(&self, booking_group_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE booking_seats SET status = 'BOOKED' WHERE booking_group_id = $1 AND status = 'LOCKED'",
        )
        .bind(booking_group_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_if_locked(&self, lock_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM booking_seats WHERE id = $1 AND status = 'LOCKED'")
            .bind(lock_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
