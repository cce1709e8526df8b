//! Create bookings table
//!
//! The booking ledger is append-mostly audit history; rows are never
//! deleted. Indexes cover owner station views, user history lookups and
//! the guest-quota count.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::StationId).string().not_null())
                    .col(ColumnDef::new(Bookings::StationName).string().not_null())
                    .col(ColumnDef::new(Bookings::PointId).string().not_null())
                    .col(ColumnDef::new(Bookings::UserId).string().not_null())
                    .col(ColumnDef::new(Bookings::UserName).string().not_null())
                    .col(ColumnDef::new(Bookings::UserPhone).string().not_null())
                    .col(ColumnDef::new(Bookings::VehicleType).string().not_null())
                    .col(ColumnDef::new(Bookings::ChargerType).string().not_null())
                    .col(ColumnDef::new(Bookings::SlotNumbers).string().not_null())
                    .col(ColumnDef::new(Bookings::BookingDate).date().not_null())
                    .col(
                        ColumnDef::new(Bookings::BookingTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("confirmed"),
                    )
                    .col(ColumnDef::new(Bookings::CancellationReason).string())
                    .col(ColumnDef::new(Bookings::DurationHours).double().not_null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_station_date")
                    .table(Bookings::Table)
                    .col(Bookings::StationId)
                    .col(Bookings::BookingDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_phone")
                    .table(Bookings::Table)
                    .col(Bookings::UserPhone)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_created")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .col(Bookings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    StationId,
    StationName,
    PointId,
    UserId,
    UserName,
    UserPhone,
    VehicleType,
    ChargerType,
    SlotNumbers,
    BookingDate,
    BookingTime,
    Status,
    CancellationReason,
    DurationHours,
    CreatedAt,
    UpdatedAt,
}
