//! Commands built on the core: the API build, model intake and avatar
//! bookkeeping.

pub mod api;
pub mod avatars;
pub mod intake;
