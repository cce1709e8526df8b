//! API data transfer objects

pub mod booking;
pub mod common;

pub use booking::{
    AvailabilityQuery, BookingDto, CreateBookingRequest, GuestCountDto, ProvisionRequest,
    ProvisionedDto, SlotAvailabilityDto, StationBookingsQuery, UpdateStatusRequest,
};
pub use common::{ApiResponse, EmptyData};
