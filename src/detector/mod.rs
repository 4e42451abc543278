//! Screen-recorder detection.
//!
//! A background loop snapshots the process table, fuzzy-matches it against
//! a catalog of known recording tools and debounces the result before
//! anything reaches the UI. Detection is best effort by process name; it is
//! not tamper-proof and every failure degrades to "not recording" so a
//! broken poller can never lock a paying viewer out of their video.

pub mod catalog;
pub mod matcher;
pub mod monitor;
pub mod process_list;
pub mod state;
