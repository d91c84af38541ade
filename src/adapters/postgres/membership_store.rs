//! PostgreSQL implementation of MembershipStore.
//!
//! Provides persistent storage for Membership aggregates using PostgreSQL.

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, MembershipId, OperatorId, Timestamp,
};
use crate::domain::membership::{Membership, MembershipStatus, PaymentMethod, PlanTerms};
use crate::ports::MembershipStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Unique constraint backing the one-membership-per-client rule.
const CLIENT_OPERATOR_KEY: &str = "memberships_client_operator_key";

/// PostgreSQL implementation of the MembershipStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresMembershipStore {
    pool: PgPool,
}

impl PostgresMembershipStore {
    /// Creates a new PostgresMembershipStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Migration failed: {}", e))
        })
    }
}

/// Database row representation of a membership.
///
/// The plan and payment column groups are nullable as units; a row with
/// only part of a group populated is corrupt.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    client_id: String,
    operator_id: String,
    status: String,
    plan_amount: Option<Decimal>,
    plan_currency: Option<String>,
    plan_billing_day: Option<i16>,
    plan_channel: Option<String>,
    plan_message: Option<String>,
    payment_brand: Option<String>,
    payment_last4: Option<String>,
    payment_exp_month: Option<i16>,
    payment_exp_year: Option<i16>,
    payment_holder_name: Option<String>,
    payment_external_reference_id: Option<String>,
    next_charge_at: Option<DateTime<Utc>>,
    last_sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let status: MembershipStatus = row
            .status
            .parse()
            .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("{}", e)))?;

        let plan = match (
            row.plan_amount,
            row.plan_currency,
            row.plan_billing_day,
            row.plan_channel,
        ) {
            (Some(amount), Some(currency), Some(billing_day), Some(channel)) => Some(PlanTerms {
                amount,
                currency,
                billing_day: u8_from_db(billing_day, "plan_billing_day")?,
                channel,
                message: row.plan_message,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Partially populated plan column group",
                ))
            }
        };

        let payment_method = match (
            row.payment_brand,
            row.payment_last4,
            row.payment_exp_month,
            row.payment_exp_year,
            row.payment_holder_name,
        ) {
            (Some(brand), Some(last4), Some(exp_month), Some(exp_year), Some(holder_name)) => {
                Some(PaymentMethod {
                    brand,
                    last4,
                    exp_month: u8_from_db(exp_month, "payment_exp_month")?,
                    exp_year: u16_from_db(exp_year, "payment_exp_year")?,
                    holder_name,
                    external_reference_id: row.payment_external_reference_id,
                })
            }
            (None, None, None, None, None) => None,
            _ => {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Partially populated payment method column group",
                ))
            }
        };

        Ok(Membership {
            id: MembershipId::from_uuid(row.id),
            client_id: ClientId::new(row.client_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("{}", e)))?,
            operator_id: OperatorId::new(row.operator_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("{}", e)))?,
            status,
            plan,
            payment_method,
            next_charge_at: row.next_charge_at.map(|dt| dt.fixed_offset()),
            last_sent_at: row.last_sent_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn u8_from_db(value: i16, column: &str) -> Result<u8, DomainError> {
    u8::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Column {} out of range: {}", column, value),
        )
    })
}

fn u16_from_db(value: i16, column: &str) -> Result<u16, DomainError> {
    u16::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Column {} out of range: {}", column, value),
        )
    })
}

#[async_trait]
impl MembershipStore for PostgresMembershipStore {
    async fn insert(&self, membership: &Membership) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (
                id, client_id, operator_id, status,
                plan_amount, plan_currency, plan_billing_day, plan_channel, plan_message,
                payment_brand, payment_last4, payment_exp_month, payment_exp_year,
                payment_holder_name, payment_external_reference_id,
                next_charge_at, last_sent_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.client_id.as_str())
        .bind(membership.operator_id.as_str())
        .bind(membership.status.as_str())
        .bind(membership.plan.as_ref().map(|p| p.amount))
        .bind(membership.plan.as_ref().map(|p| p.currency.as_str()))
        .bind(membership.plan.as_ref().map(|p| i16::from(p.billing_day)))
        .bind(membership.plan.as_ref().map(|p| p.channel.as_str()))
        .bind(membership.plan.as_ref().and_then(|p| p.message.as_deref()))
        .bind(membership.payment_method.as_ref().map(|pm| pm.brand.as_str()))
        .bind(membership.payment_method.as_ref().map(|pm| pm.last4.as_str()))
        .bind(membership.payment_method.as_ref().map(|pm| i16::from(pm.exp_month)))
        .bind(membership.payment_method.as_ref().map(|pm| pm.exp_year as i16))
        .bind(membership.payment_method.as_ref().map(|pm| pm.holder_name.as_str()))
        .bind(
            membership
                .payment_method
                .as_ref()
                .and_then(|pm| pm.external_reference_id.as_deref()),
        )
        .bind(membership.next_charge_at.map(|dt| dt.with_timezone(&Utc)))
        .bind(membership.last_sent_at.as_ref().map(|ts| *ts.as_datetime()))
        .bind(membership.created_at.as_datetime())
        .bind(membership.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(CLIENT_OPERATOR_KEY) {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        "Client already has a membership under this operator",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert membership: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, membership: &Membership) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships SET
                status = $2,
                plan_amount = $3,
                plan_currency = $4,
                plan_billing_day = $5,
                plan_channel = $6,
                plan_message = $7,
                payment_brand = $8,
                payment_last4 = $9,
                payment_exp_month = $10,
                payment_exp_year = $11,
                payment_holder_name = $12,
                payment_external_reference_id = $13,
                next_charge_at = $14,
                last_sent_at = $15,
                updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.status.as_str())
        .bind(membership.plan.as_ref().map(|p| p.amount))
        .bind(membership.plan.as_ref().map(|p| p.currency.as_str()))
        .bind(membership.plan.as_ref().map(|p| i16::from(p.billing_day)))
        .bind(membership.plan.as_ref().map(|p| p.channel.as_str()))
        .bind(membership.plan.as_ref().and_then(|p| p.message.as_deref()))
        .bind(membership.payment_method.as_ref().map(|pm| pm.brand.as_str()))
        .bind(membership.payment_method.as_ref().map(|pm| pm.last4.as_str()))
        .bind(membership.payment_method.as_ref().map(|pm| i16::from(pm.exp_month)))
        .bind(membership.payment_method.as_ref().map(|pm| pm.exp_year as i16))
        .bind(membership.payment_method.as_ref().map(|pm| pm.holder_name.as_str()))
        .bind(
            membership
                .payment_method
                .as_ref()
                .and_then(|pm| pm.external_reference_id.as_deref()),
        )
        .bind(membership.next_charge_at.map(|dt| dt.with_timezone(&Utc)))
        .bind(membership.last_sent_at.as_ref().map(|ts| *ts.as_datetime()))
        .bind(membership.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update membership: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MembershipNotFound,
                "Membership not found",
            ));
        }

        Ok(())
    }

    async fn find_by_client_and_operator(
        &self,
        client_id: &ClientId,
        operator_id: &OperatorId,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, operator_id, status,
                   plan_amount, plan_currency, plan_billing_day, plan_channel, plan_message,
                   payment_brand, payment_last4, payment_exp_month, payment_exp_year,
                   payment_holder_name, payment_external_reference_id,
                   next_charge_at, last_sent_at, created_at, updated_at
            FROM memberships
            WHERE client_id = $1 AND operator_id = $2
            "#,
        )
        .bind(client_id.as_str())
        .bind(operator_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find membership: {}", e),
            )
        })?;

        row.map(Membership::try_from).transpose()
    }

    async fn list_by_operator(
        &self,
        operator_id: &OperatorId,
    ) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, operator_id, status,
                   plan_amount, plan_currency, plan_billing_day, plan_channel, plan_message,
                   payment_brand, payment_last4, payment_exp_month, payment_exp_year,
                   payment_holder_name, payment_external_reference_id,
                   next_charge_at, last_sent_at, created_at, updated_at
            FROM memberships
            WHERE operator_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(operator_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list memberships: {}", e),
            )
        })?;

        rows.into_iter().map(Membership::try_from).collect()
    }
}
