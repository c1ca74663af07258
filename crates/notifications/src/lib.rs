//! `nexus-notifications`: the human-readable event feed.
//!
//! The ledger core only ever talks to [`NotificationSink`]; it never reads
//! notifications back.

pub mod feed;
pub mod notification;
pub mod sink;

pub use feed::NotificationFeed;
pub use notification::{Notification, titles};
pub use sink::NotificationSink;
