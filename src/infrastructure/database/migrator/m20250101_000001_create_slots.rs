//! Create slots table
//!
//! Stores the pre-generated slot inventory per charging point.
//! The unique index on (station_id, point_id, slot_number) backs the
//! registry's uniqueness invariant.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Slots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Slots::StationId).string().not_null())
                    .col(ColumnDef::new(Slots::PointId).string().not_null())
                    .col(ColumnDef::new(Slots::SlotNumber).integer().not_null())
                    .col(ColumnDef::new(Slots::StartTime).string().not_null())
                    .col(ColumnDef::new(Slots::EndTime).string().not_null())
                    .col(
                        ColumnDef::new(Slots::IsBooked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Slots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_station_point_number")
                    .table(Slots::Table)
                    .col(Slots::StationId)
                    .col(Slots::PointId)
                    .col(Slots::SlotNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_is_booked")
                    .table(Slots::Table)
                    .col(Slots::IsBooked)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Slots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Slots {
    Table,
    Id,
    StationId,
    PointId,
    SlotNumber,
    StartTime,
    EndTime,
    IsBooked,
    CreatedAt,
    UpdatedAt,
}
