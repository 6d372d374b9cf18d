//! Profiling support via Tracy.
//!
//! Re-exports the CPU profiling macros of [`tessel_core::profiling`]. Spans
//! are recorded only when the `profiling` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! tessel-graphics = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! ```ignore
//! use tessel_graphics::profiling::profile_scope;
//!
//! fn select_technique() {
//!     profile_scope!("select_technique");
//! }
//! ```

pub use tessel_core::profiling::{profile_function, profile_message, profile_scope};
