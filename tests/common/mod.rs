#![allow(dead_code)]

pub mod fake_directory;
pub mod test_certs;

pub use fake_directory::{FakeDirectory, SwappableDirectory};
pub use test_certs::{certificate_pem, days};
