//! In-memory repository implementations
//!
//! Backs the service unit tests and makes the engine runnable without a
//! database. The slot map sits behind one mutex so the claim-and-book step
//! is serialized exactly like the SQL transaction; the booking ledger is a
//! concurrent map keyed by booking ID.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::allocation::AllocationStore;
use crate::domain::booking::{Booking, BookingRepository, BookingStatus};
use crate::domain::slot::{Slot, SlotRepository};
use crate::domain::RepositoryProvider;
use crate::shared::{DomainError, DomainResult};

type SlotKey = (String, String, i32);

/// In-memory store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<SlotKey, Slot>>,
    bookings: DashMap<String, Booking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// RepositoryProvider over a single shared MemoryStore.
#[derive(Default)]
pub struct MemoryRepositoryProvider {
    store: MemoryStore,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for MemoryRepositoryProvider {
    fn slots(&self) -> &dyn SlotRepository {
        &self.store
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.store
    }

    fn allocations(&self) -> &dyn AllocationStore {
        &self.store
    }
}

// ── SlotRepository ──────────────────────────────────────────────

#[async_trait]
impl SlotRepository for MemoryStore {
    async fn insert_many(&self, slots: Vec<Slot>) -> DomainResult<()> {
        let mut map = self.slots.lock().await;
        for slot in slots {
            let key = (
                slot.station_id.clone(),
                slot.point_id.clone(),
                slot.slot_number,
            );
            if map.contains_key(&key) {
                return Err(DomainError::Conflict(format!(
                    "Slot {}/{}/{}",
                    key.0, key.1, key.2
                )));
            }
            map.insert(key, slot);
        }
        Ok(())
    }

    async fn count_for_point(&self, station_id: &str, point_id: &str) -> DomainResult<u64> {
        let map = self.slots.lock().await;
        Ok(map
            .values()
            .filter(|s| s.station_id == station_id && s.point_id == point_id)
            .count() as u64)
    }

    async fn find_free(&self, station_id: &str, point_id: &str) -> DomainResult<Vec<Slot>> {
        let map = self.slots.lock().await;
        let mut free: Vec<Slot> = map
            .values()
            .filter(|s| s.station_id == station_id && s.point_id == point_id && !s.is_booked)
            .cloned()
            .collect();
        free.sort_by_key(|s| s.slot_number);
        Ok(free)
    }

    async fn find_free_numbers(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<Vec<i32>> {
        let map = self.slots.lock().await;
        let mut free: Vec<i32> = numbers
            .iter()
            .filter(|n| {
                map.get(&(station_id.to_string(), point_id.to_string(), **n))
                    .is_some_and(|s| !s.is_booked)
            })
            .copied()
            .collect();
        free.sort_unstable();
        Ok(free)
    }

    async fn release(
        &self,
        station_id: &str,
        point_id: &str,
        numbers: &[i32],
    ) -> DomainResult<u64> {
        let mut map = self.slots.lock().await;
        let mut touched = 0;
        for n in numbers {
            if let Some(slot) = map.get_mut(&(station_id.to_string(), point_id.to_string(), *n)) {
                slot.is_booked = false;
                slot.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn release_all(&self) -> DomainResult<u64> {
        let mut map = self.slots.lock().await;
        let mut released = 0;
        for slot in map.values_mut().filter(|s| s.is_booked) {
            slot.is_booked = false;
            slot.updated_at = Utc::now();
            released += 1;
        }
        Ok(released)
    }
}

// ── AllocationStore ─────────────────────────────────────────────

#[async_trait]
impl AllocationStore for MemoryStore {
    async fn reserve(&self, booking: Booking) -> DomainResult<Booking> {
        // Single lock over the slot map = the atomic critical section.
        let mut map = self.slots.lock().await;

        let conflicting: Vec<i32> = booking
            .slot_numbers
            .iter()
            .filter(|n| {
                !map.get(&(booking.station_id.clone(), booking.point_id.clone(), **n))
                    .is_some_and(|s| !s.is_booked)
            })
            .copied()
            .collect();

        if !conflicting.is_empty() {
            return Err(DomainError::SlotConflict { conflicting });
        }

        for n in &booking.slot_numbers {
            if let Some(slot) =
                map.get_mut(&(booking.station_id.clone(), booking.point_id.clone(), *n))
            {
                slot.is_booked = true;
                slot.updated_at = Utc::now();
            }
        }

        self.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }
}

// ── BookingRepository ───────────────────────────────────────────

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(id).map(|b| b.clone()))
    }

    async fn update(&self, booking: Booking) -> DomainResult<()> {
        if !self.bookings.contains_key(&booking.id) {
            return Err(DomainError::NotFound {
                entity: "Booking",
                field: "id",
                value: booking.id,
            });
        }
        self.bookings.insert(booking.id.clone(), booking);
        Ok(())
    }

    async fn find_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let mut result: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.user_phone == phone)
            .map(|b| b.clone())
            .collect();
        result.sort_by(|a, b| b.booking_time.cmp(&a.booking_time));
        Ok(result)
    }

    async fn find_active_by_user_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let mut result: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.user_phone == phone && b.status == BookingStatus::Confirmed)
            .map(|b| b.clone())
            .collect();
        result.sort_by(|a, b| b.booking_time.cmp(&a.booking_time));
        Ok(result)
    }

    async fn find_for_station(
        &self,
        station_id: &str,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
    ) -> DomainResult<Vec<Booking>> {
        let mut result: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| {
                b.station_id == station_id
                    && date.is_none_or(|d| b.booking_date == d)
                    && status.is_none_or(|s| b.status == s)
            })
            .map(|b| b.clone())
            .collect();
        result.sort_by(|a, b| a.booking_time.cmp(&b.booking_time));
        Ok(result)
    }

    async fn count_for_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id && b.created_at >= since)
            .count() as u64)
    }

    async fn cancel_confirmed_on(&self, date: NaiveDate, reason: &str) -> DomainResult<u64> {
        let mut cancelled = 0;
        for mut entry in self.bookings.iter_mut() {
            if entry.booking_date == date && entry.status == BookingStatus::Confirmed {
                entry.status = BookingStatus::Cancelled;
                entry.cancellation_reason = Some(reason.to_string());
                entry.updated_at = Utc::now();
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }
}
