//! Certificate decoding and health classification. Nothing in here performs I/O.

pub mod classifier;
pub mod hostname;
pub mod parser;

pub use classifier::{classify, days_left};
pub use hostname::{certificate_covers, matches_host};
pub use parser::parse_certificate;
