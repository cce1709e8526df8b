pub mod allocation;
pub mod daily_reset;
pub mod lifecycle;
pub mod provisioning;
pub mod quota;

pub use allocation::{AllocationService, ReserveCommand, SlotAvailability};
pub use daily_reset::{run_daily_reset, start_daily_reset_task, NO_SHOW_REASON};
pub use lifecycle::LifecycleService;
pub use provisioning::ProvisioningService;
pub use quota::GuestQuotaGate;
