//! Domain types for bank rate observations.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BankCode`] | Closed set of bank identifiers |
//! | [`Rate`] | Positive USD buying rate in LKR |
//! | [`RateObservation`] | Persisted `(rate, fetchedAt, bank)` triple |
//! | [`UtcDateTime`] | UTC timestamp, microsecond precision |
//! | [`Period`] / [`QueryWindow`] | Named history windows |

mod bank;
mod observation;
mod rate;
mod timestamp;
mod window;

pub use bank::BankCode;
pub use observation::RateObservation;
pub use rate::Rate;
pub use timestamp::UtcDateTime;
pub use window::{Period, QueryWindow};
