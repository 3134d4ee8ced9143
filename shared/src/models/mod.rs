//! Domain models for the Block Inventory Platform

mod block;
mod block_type;
mod dashboard;
mod legacy;
mod supplier;
mod user;

pub use block::*;
pub use block_type::*;
pub use dashboard::*;
pub use legacy::*;
pub use supplier::*;
pub use user::*;
