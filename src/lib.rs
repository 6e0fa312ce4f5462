//! A block-device signature prober: given an open file or block device,
//! walk a fixed, ordered registry of format descriptors and report the
//! attributes (type, usage class, version, label, UUID) of the first one
//! whose structural check passes.
//!
//! The entry point is [`Session`]: bind a device with [`Session::set_device`],
//! request the attributes you want with [`Session::set_request`], then call
//! [`Session::step`] to advance to the next match.

pub mod crc;
pub mod error;
pub mod filter;
pub mod flags;
pub mod formats;
pub mod reader;
pub mod registry;
pub mod session;
pub mod text;
pub mod value;

pub use error::{ProbeError, Result};
pub use filter::Filter;
pub use flags::{FilterMode, RequestFlags, UsageClass};
pub use registry::known_fstype;
pub use session::{Session, StepOutcome};
pub use value::Value;
