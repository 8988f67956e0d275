//! Platform naming conventions.
//!
//! Only the pieces of the host platform that influence file naming live here;
//! there is no cross-compilation support.

pub mod os;

use os::Os;

/// Returns the shared-library extension for the host (e.g., "so" or "dylib").
///
/// Falls back to the standard library's notion of the platform's dynamic
/// library extension on operating systems `Os` does not know about.
pub fn shared_lib_ext() -> &'static str {
  Os::current()
    .map(|os| os.shared_lib_ext())
    .unwrap_or(std::env::consts::DLL_EXTENSION)
}
