//! SeaORM implementation of SlotRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::slot::{Slot, SlotRepository};
use crate::infrastructure::database::entities::slot;
use crate::shared::{DomainError, DomainResult};

pub struct SeaOrmSlotRepository {
    db: DatabaseConnection,
}

impl SeaOrmSlotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: slot::Model) -> Slot {
    Slot {
        station_id: m.station_id,
        point_id: m.point_id,
        slot_number: m.slot_number,
        start_time: m.start_time,
        end_time: m.end_time,
        is_booked: m.is_booked,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── SlotRepository impl ─────────────────────────────────────────

#[async_trait]
impl SlotRepository for SeaOrmSlotRepository {
    async fn insert_many(&self, slots: Vec<Slot>) -> DomainResult<()> {
        debug!("Inserting {} slots", slots.len());

        let models: Vec<slot::ActiveModel> = slots
            .into_iter()
            .map(|s| slot::ActiveModel {
                id: Default::default(),
                station_id: Set(s.station_id),
                point_id: Set(s.point_id),
                slot_number: Set(s.slot_number),
                start_time: Set(s.start_time),
                end_time: Set(s.end_time),
                is_booked: Set(s.is_booked),
                created_at: Set(s.created_at),
                updated_at: Set(s.updated_at),
            })
            .collect();

        slot::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count_for_point(&self, station_id: &str, point_id: &str) -> DomainResult<u64> {
        slot::Entity::find()
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::PointId.eq(point_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_free(&self, station_id: &str, point_id: &str) -> DomainResult<Vec<Slot>> {
        let models = slot::Entity::find()
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::PointId.eq(point_id))
            .filter(slot::Column::IsBooked.eq(false))
            .order_by_asc(slot::Column::SlotNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_free_numbers(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<Vec<i32>> {
        let models = slot::Entity::find()
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::PointId.eq(point_id))
            .filter(slot::Column::SlotNumber.is_in(numbers.to_vec()))
            .filter(slot::Column::IsBooked.eq(false))
            .order_by_asc(slot::Column::SlotNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(|m| m.slot_number).collect())
    }

    async fn release(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<u64> {
        debug!("Releasing slots {:?} at {}/{}", numbers, station_id, point_id);

        let result = slot::Entity::update_many()
            .col_expr(slot::Column::IsBooked, Expr::value(false))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::PointId.eq(point_id))
            .filter(slot::Column::SlotNumber.is_in(numbers.to_vec()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn release_all(&self) -> DomainResult<u64> {
        let result = slot::Entity::update_many()
            .col_expr(slot::Column::IsBooked, Expr::value(false))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::IsBooked.eq(true))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
