//! Optional Tracy instrumentation.
//!
//! With the `profiling` feature each zone becomes a Tracy span and messages
//! land on the Tracy timeline. Without it [`Zone`] is an empty guard and the
//! macros cost nothing. The feature is resolved in this crate, so dependents
//! need no `cfg` of their own.
//!
//! ```ignore
//! use tessel_core::profiling::{profile_function, profile_scope};
//!
//! fn combine_meshes() {
//!     profile_function!();
//!     {
//!         profile_scope!("remap_indices");
//!     }
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client;

/// Guard that closes its profiling zone when dropped.
#[must_use = "the zone ends as soon as the guard is dropped"]
pub struct Zone {
    #[cfg(feature = "profiling")]
    _span: Option<tracy_client::Span>,
}

impl Zone {
    /// Open a zone. Does nothing unless a Tracy client is running.
    #[inline]
    pub fn enter(name: &str, function: &str, file: &str, line: u32) -> Self {
        #[cfg(feature = "profiling")]
        {
            let span = tracy_client::Client::running()
                .map(|client| client.span_alloc(Some(name), function, file, line, 0));
            Self { _span: span }
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = (name, function, file, line);
            Self {}
        }
    }
}

/// Post `text` to the profiler timeline.
#[inline]
pub fn message(text: &str) {
    #[cfg(feature = "profiling")]
    if let Some(client) = tracy_client::Client::running() {
        client.message(text, 0);
    }
    #[cfg(not(feature = "profiling"))]
    let _ = text;
}

/// Whether zones are recorded by this build.
pub const fn enabled() -> bool {
    cfg!(feature = "profiling")
}

/// Profile the rest of the enclosing block under `name`.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_zone =
            $crate::profiling::Zone::enter($name, module_path!(), file!(), line!());
    };
}

/// Profile the rest of the enclosing function, named after its module.
#[macro_export]
macro_rules! profile_function {
    () => {
        let _profile_zone =
            $crate::profiling::Zone::enter(module_path!(), module_path!(), file!(), line!());
    };
}

#[macro_export]
macro_rules! profile_message {
    ($msg:expr) => {
        $crate::profiling::message($msg)
    };
}

pub use profile_function;
pub use profile_message;
pub use profile_scope;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zones_without_client() {
        profile_function!();
        {
            profile_scope!("inner");
            profile_message!("hello");
        }
        assert_eq!(enabled(), cfg!(feature = "profiling"));
    }
}
