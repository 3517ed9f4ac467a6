//! Services for report storage, aggregation and calculation

pub mod aggregator;
pub mod duration;
pub mod filter;
pub mod odometer;
pub mod store;

pub use aggregator::Aggregator;
pub use filter::{paginate, recent, PageSlice, ReportFilter, WorkStatus, ITEMS_PER_PAGE, RECENT_COUNT};
pub use odometer::OdometerPolicy;
pub use store::{ReportStore, StorePolicy};
