//! SeaORM implementation of AllocationStore
//!
//! The reserve critical section: a conditional `is_booked = false` guarded
//! update plus the ledger insert, committed as one transaction. The guard
//! re-checked at write time is what makes concurrent reservers serialize
//! per slot; a plain read-then-write would admit lost updates.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionError, TransactionTrait,
};
use thiserror::Error;

use crate::domain::allocation::AllocationStore;
use crate::domain::booking::Booking;
use crate::infrastructure::database::entities::slot;
use crate::shared::{DomainError, DomainResult};

use super::booking_repository::domain_to_model;
use super::slot_repository::db_err;

pub struct SeaOrmAllocationStore {
    db: DatabaseConnection,
}

impl SeaOrmAllocationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Internal error for the reserve transaction; `Raced` forces a rollback
/// when the guarded update claimed fewer rows than requested.
#[derive(Debug, Error)]
enum ReserveTxError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("slots claimed by a concurrent reserver")]
    Raced,
}

async fn free_numbers<C: ConnectionTrait>(
    conn: &C,
    station_id: &str,
    point_id: &str,
    numbers: &[i32],
) -> Result<Vec<i32>, DbErr> {
    let models = slot::Entity::find()
        .filter(slot::Column::StationId.eq(station_id))
        .filter(slot::Column::PointId.eq(point_id))
        .filter(slot::Column::SlotNumber.is_in(numbers.to_vec()))
        .filter(slot::Column::IsBooked.eq(false))
        .order_by_asc(slot::Column::SlotNumber)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(|m| m.slot_number).collect())
}

fn conflict_between(requested: &[i32], free: &[i32]) -> DomainError {
    let conflicting = requested
        .iter()
        .filter(|n| !free.contains(n))
        .copied()
        .collect();
    DomainError::SlotConflict { conflicting }
}

#[async_trait]
impl AllocationStore for SeaOrmAllocationStore {
    async fn reserve(&self, booking: Booking) -> DomainResult<Booking> {
        let requested = booking.slot_numbers.clone();

        // Fast-fail pre-check: compute the precise conflict set without
        // opening a write transaction.
        let free = free_numbers(&self.db, &booking.station_id, &booking.point_id, &requested)
            .await
            .map_err(db_err)?;
        if free.len() != requested.len() {
            return Err(conflict_between(&requested, &free));
        }

        let station_id = booking.station_id.clone();
        let point_id = booking.point_id.clone();
        let numbers = requested.clone();
        let model = domain_to_model(&booking);

        let result = self
            .db
            .transaction::<_, (), ReserveTxError>(|txn| {
                Box::pin(async move {
                    let claimed = slot::Entity::update_many()
                        .col_expr(slot::Column::IsBooked, Expr::value(true))
                        .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(slot::Column::StationId.eq(station_id))
                        .filter(slot::Column::PointId.eq(point_id))
                        .filter(slot::Column::SlotNumber.is_in(numbers.clone()))
                        .filter(slot::Column::IsBooked.eq(false))
                        .exec(txn)
                        .await?;

                    // A concurrent reserver won some slot between the
                    // pre-check and the guarded update; roll everything back.
                    if claimed.rows_affected != numbers.len() as u64 {
                        return Err(ReserveTxError::Raced);
                    }

                    model.insert(txn).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => {
                debug!(
                    "Reserved slots {:?} at {}/{} for booking {}",
                    requested, booking.station_id, booking.point_id, booking.id
                );
                Ok(booking)
            }
            Err(TransactionError::Connection(e)) => Err(db_err(e)),
            Err(TransactionError::Transaction(ReserveTxError::Db(e))) => Err(db_err(e)),
            Err(TransactionError::Transaction(ReserveTxError::Raced)) => {
                // Recompute the conflict set from fresh post-rollback state.
                let free =
                    free_numbers(&self.db, &booking.station_id, &booking.point_id, &requested)
                        .await
                        .map_err(db_err)?;
                Err(conflict_between(&requested, &free))
            }
        }
    }
}
