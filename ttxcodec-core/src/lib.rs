//! # ttxcodec core
//!
//! Teletext page model with the error protection and file formats needed to
//! move pages between editors, inserters and capture tools.
//!
//! ## Modules
//!
//! - `hamming`: Hamming 8/4, Hamming 24/18 and odd parity
//! - `packet`: Sparse packet storage for one page
//! - `triplet` / `enhancement`: X/26 enhancement triplets and their validation
//! - `links` / `region`: X/27 navigation links and X/28 region fields
//! - `page`: The level 1-3.5 page that interprets its own packets
//! - `observer`: Change notification for editing hosts
//! - `format`: Codec trait and registry
//! - `tti`, `t42`, `ep1`, `htt`: File formats

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod constants;
pub mod enhancement;
pub mod ep1;
pub mod error;
pub mod format;
pub mod hamming;
pub mod htt;
pub mod links;
pub mod observer;
pub mod packet;
pub mod page;
pub mod pageset;
pub mod region;
pub mod t42;
pub mod triplet;
pub mod tti;

// Re-export commonly used types
pub use enhancement::{ListEdit, Position, TripletError, TripletList, TripletState};
pub use error::CodecError;
pub use format::{FormatId, FormatRegistry, LoadOutcome, PageFormat, SaveOutcome};
pub use links::{ComposeLink, FastTextLink};
pub use observer::{ObservedPage, PageChange, PageObserver};
pub use packet::{Packet, PacketPage, PacketStore};
pub use page::{ControlBit, CycleType, Level, LevelOnePage};
pub use pageset::PageSet;
pub use region::RegionFields;
pub use triplet::Triplet;

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, CodecError>;
