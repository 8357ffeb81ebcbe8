use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;

/// Version a driver reports when no schema has ever been applied.
///
/// Real versions are never negative, and 0 is a valid version, so callers
/// must compare against this constant rather than test for zero.
pub const NIL_VERSION: i64 = -1;

/// Version marker persisted in a live database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverVersion {
    /// Recorded schema version, or [`NIL_VERSION`].
    pub version: i64,
    /// True if the last migration step did not complete.
    pub dirty: bool,
}

impl DriverVersion {
    pub fn new(version: i64, dirty: bool) -> Self {
        Self { version, dirty }
    }

    /// Marker for a database with no recorded version.
    pub fn nil() -> Self {
        Self {
            version: NIL_VERSION,
            dirty: false,
        }
    }

    pub fn is_nil(&self) -> bool {
        self.version == NIL_VERSION
    }
}

/// Read access to a database's schema version marker.
///
/// Errors are reserved for infrastructure failures (connectivity, permission,
/// a corrupted version record). A database that was never migrated is not an
/// error: it reports [`DriverVersion::nil`].
pub trait VersionDriver: Send + Sync {
    /// Read the current version and dirty flag.
    fn version(&self) -> Pin<Box<dyn Future<Output = Result<DriverVersion>> + Send + '_>>;
}

impl<T: VersionDriver + ?Sized> VersionDriver for Arc<T> {
    fn version(&self) -> Pin<Box<dyn Future<Output = Result<DriverVersion>> + Send + '_>> {
        (**self).version()
    }
}

impl<T: VersionDriver + ?Sized> VersionDriver for Box<T> {
    fn version(&self) -> Pin<Box<dyn Future<Output = Result<DriverVersion>> + Send + '_>> {
        (**self).version()
    }
}
