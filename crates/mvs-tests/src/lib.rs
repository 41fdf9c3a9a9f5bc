//! End-to-end tests for the multi-view artifact crates.
//!
//! Each test plays two pipeline stages against one output tree: a producer
//! that writes artifacts by address and a consumer that reads them back from
//! a freshly loaded session.
