//! Resource cleanup guards
//!
//! RAII guards that restore process-wide state on every exit path,
//! including early returns through `?` and unwinding panics.

mod handler;

pub use handler::*;
