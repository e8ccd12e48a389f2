//! State tracking module
//!
//! This module defines the states a link check moves through while it is
//! being verified.

mod link_state;

pub use link_state::{LinkState, RequestMode};
