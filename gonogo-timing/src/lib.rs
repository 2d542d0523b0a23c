pub mod clock;
pub mod timers;

pub use clock::{Clock, HighPrecisionClock, ManualClock};
pub use timers::{TimerHandle, TimerQueue};
