//! Business logic services for the Block Inventory Platform

pub mod block_type;
pub mod dashboard;
pub mod inventory;
pub mod supplier;
pub mod user;

pub use block_type::BlockTypeService;
pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use supplier::SupplierService;
pub use user::UserService;
