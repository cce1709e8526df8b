//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::booking::{Booking, BookingRepository, BookingStatus};
use crate::infrastructure::database::entities::booking;
use crate::shared::{DomainError, DomainResult};

use super::slot_repository::db_err;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: booking::Model) -> Booking {
    Booking {
        id: m.id,
        station_id: m.station_id,
        station_name: m.station_name,
        point_id: m.point_id,
        user_id: m.user_id,
        user_name: m.user_name,
        user_phone: m.user_phone,
        vehicle_type: m.vehicle_type,
        charger_type: m.charger_type,
        slot_numbers: serde_json::from_str(&m.slot_numbers).unwrap_or_default(),
        booking_date: m.booking_date,
        booking_time: m.booking_time,
        status: BookingStatus::parse(&m.status).unwrap_or(BookingStatus::Cancelled),
        cancellation_reason: m.cancellation_reason,
        duration_hours: m.duration_hours,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

pub(crate) fn domain_to_model(b: &Booking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(b.id.clone()),
        station_id: Set(b.station_id.clone()),
        station_name: Set(b.station_name.clone()),
        point_id: Set(b.point_id.clone()),
        user_id: Set(b.user_id.clone()),
        user_name: Set(b.user_name.clone()),
        user_phone: Set(b.user_phone.clone()),
        vehicle_type: Set(b.vehicle_type.clone()),
        charger_type: Set(b.charger_type.clone()),
        slot_numbers: Set(serde_json::to_string(&b.slot_numbers).unwrap_or_else(|_| "[]".into())),
        booking_date: Set(b.booking_date),
        booking_time: Set(b.booking_time),
        status: Set(b.status.as_str().to_string()),
        cancellation_reason: Set(b.cancellation_reason.clone()),
        duration_hours: Set(b.duration_hours),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, b: Booking) -> DomainResult<()> {
        debug!("Updating booking {} -> {}", b.id, b.status);

        let existing = booking::Entity::find_by_id(&b.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: b.id,
            });
        }

        domain_to_model(&b).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserPhone.eq(phone))
            .order_by_desc(booking::Column::BookingTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_active_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserPhone.eq(phone))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .order_by_desc(booking::Column::BookingTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_for_station(
        &self,
        station_id: &str,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
    ) -> DomainResult<Vec<Booking>> {
        let mut query = booking::Entity::find()
            .filter(booking::Column::StationId.eq(station_id));

        if let Some(date) = date {
            query = query.filter(booking::Column::BookingDate.eq(date));
        }
        if let Some(status) = status {
            query = query.filter(booking::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_asc(booking::Column::BookingTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn count_for_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64> {
        booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn cancel_confirmed_on(&self, date: NaiveDate, reason: &str) -> DomainResult<u64> {
        let result = booking::Entity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .col_expr(booking::Column::CancellationReason, Expr::value(reason))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::BookingDate.eq(date))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
