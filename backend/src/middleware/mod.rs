//! Request middleware shared by every route.

pub mod trace;

pub use trace::trace_requests;
