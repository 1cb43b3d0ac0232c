//! Connection string handling
//!
//! Templates carry host, database and parameters; credentials are injected
//! per connection attempt.

mod connection_string;

pub use connection_string::{ConnectionString, DsnTemplate, SslMode};
