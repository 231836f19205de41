//! Data models for the EMSA application.
//!
//! One canonical request/response shape per endpoint; the client and the
//! mock backend share these types so the contract cannot drift.

mod group;
mod media;
mod user;

pub use group::*;
pub use media::*;
pub use user::*;
