//! Temporary artifact lifecycle.
//!
//! Every request owns a small set of files in one shared temp directory:
//! the uploaded input `<requestId>.<ext>`, the produced `<requestId>.pdf`,
//! and possibly a bridged `<uuid>.hwpx`. [`ArtifactStore`] hands out those
//! names; [`cleanup`] and [`CleanupGuard`] make sure none of them outlives
//! the request.

mod cleanup;
mod store;

pub use cleanup::{cleanup, cleanup_blocking, CleanupGuard, CleanupReport};
pub use store::ArtifactStore;
