pub mod catalog;
pub mod images;
pub mod maintenance;
pub mod server;

pub use catalog::CatalogService;
pub use images::ImageQueue;
pub use maintenance::MaintenanceService;
