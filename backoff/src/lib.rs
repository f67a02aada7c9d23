//! Exponential backoff counter with optional jitter.
//!
//! [`Backoff`] computes how long a retry loop should wait next. It never sleeps.
//!
//! ```
//! use std::time::Duration;
//! use backoff::Backoff;
//!
//! let mut b = Backoff::new(Duration::from_millis(100), Duration::from_secs(10), 2.0, false).unwrap();
//! assert_eq!(b.next_delay(), Duration::from_millis(100));
//! assert_eq!(b.next_delay(), Duration::from_millis(200));
//! b.reset();
//! assert_eq!(b.next_delay(), Duration::from_millis(100));
//! ```

pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod output;
pub mod util;

pub use config::BackoffConfig;
pub use counter::Backoff;
pub use error::ConfigError;
