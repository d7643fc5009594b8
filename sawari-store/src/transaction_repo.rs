use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_domain::repository::TransactionRepository;
use sawari_domain::transaction::GatewayReference;
use sawari_domain::{PaymentTransaction, StoreError, TransactionStatus};

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    booking_group_id: Uuid,
    contact_mobile: String,
    contact_email: String,
    base_fare: f64,
    gst: f64,
    discount: f64,
    total: f64,
    payment_method: Option<String>,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TransactionRow> for PaymentTransaction {
    fn from(row: TransactionRow) -> Self {
        PaymentTransaction {
            id: row.id,
            booking_group_id: row.booking_group_id,
            contact_mobile: row.contact_mobile,
            contact_email: row.contact_email,
            base_fare: row.base_fare,
            gst: row.gst,
            discount: row.discount,
            total: row.total,
            payment_method: row.payment_method,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            status: TransactionStatus::parse(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn insert(&self, txn: &PaymentTransaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, booking_group_id, contact_mobile, contact_email,
                 base_fare, gst, discount, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(txn.id)
        .bind(txn.booking_group_id)
        .bind(&txn.contact_mobile)
        .bind(&txn.contact_email)
        .bind(txn.base_fare)
        .bind(txn.gst)
        .bind(txn.discount)
        .bind(txn.total)
        .bind(txn.status.as_str())
        .bind(txn.created_at)
        .bind(txn.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PaymentTransaction>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, booking_group_id, contact_mobile, contact_email,
                   base_fare, gst, discount, total, payment_method,
                   gateway_order_id, gateway_payment_id, status,
                   created_at, updated_at
            FROM transactions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PaymentTransaction::from))
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: TransactionStatus,
        discount: f64,
        total: f64,
        gateway: &GatewayReference,
    ) -> Result<bool, StoreError> {
        // Conditional on INITIATED so a terminal transaction can never be
        // reopened or double-settled.
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $1, discount = $2, total = $3, payment_method = $4,
                gateway_order_id = $5, gateway_payment_id = $6, updated_at = NOW()
            WHERE id = $7 AND status = 'INITIATED'
            "#,
        )
        .bind(status.as_str())
        .bind(discount)
        .bind(total)
        .bind(&gateway.method)
        .bind(&gateway.order_id)
        .bind(&gateway.payment_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
