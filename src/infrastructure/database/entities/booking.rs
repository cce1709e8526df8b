//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// UUID v4
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub station_id: String,
    pub station_name: String,
    pub point_id: String,

    pub user_id: String,
    pub user_name: String,
    pub user_phone: String,

    pub vehicle_type: String,
    pub charger_type: String,

    /// JSON-encoded array of slot numbers, e.g. "[10,11]"
    pub slot_numbers: String,

    /// Canonical ISO calendar date the reservation is for
    pub booking_date: Date,
    pub booking_time: DateTimeUtc,

    /// Booking status: confirmed, cancelled, completed
    pub status: String,

    #[sea_orm(nullable)]
    pub cancellation_reason: Option<String>,

    pub duration_hours: f64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
