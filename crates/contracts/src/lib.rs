//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! All business crates depend only on this crate; reverse dependencies are
//! prohibited.
//!
//! ## Naming model
//! - A *night* is an 8-char zero-padded `YYYYMMDD` string; ordering is
//!   lexicographic, never calendar-aware.
//! - An *exposure* is one `simspec` input file, identified by night + expid.
//! - A *camera* is one instrument channel mounted on one spectrograph
//!   (e.g. `b0` .. `z9`).

mod blueprint;
mod camera;
mod error;
mod exposure;
mod layout;
mod night;
mod work;

pub use blueprint::*;
pub use camera::{Camera, Channel};
pub use error::*;
pub use exposure::{ExpId, Flavor};
pub use layout::{DataLayout, FrameFormat};
pub use night::{Night, NightRange};
pub use work::*;
