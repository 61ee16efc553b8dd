mod backend_impl;
mod broker_impl;
mod contact_impl;
pub mod filter_impl;
mod message_impl;
mod property_impl;
pub mod schema;
mod user_impl;

pub use backend_impl::PostgresBackend;
pub use filter_impl::PostgresFilterConverter;
