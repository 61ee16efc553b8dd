pub mod listing_query;
pub mod pagination;

pub use listing_query::{ListingFilter, ListingQuery};
pub use pagination::PageRequest;
