#![allow(unused_imports)]

pub(crate) mod fake_server;
pub(crate) mod fixtures;

pub use fake_server::*;
pub use fixtures::*;
