//! Boundary with the capture runtime.
//!
//! The runtime itself (device enumeration, transports, decoding) lives
//! outside this crate. It is reached through two traits:
//! - [`CaptureRuntime`] opens the root connection and streams events
//! - [`PropertyChannel`] is one opened connection (root, device or device manager)
//!
//! [`MemoryRuntime`] is an in-process implementation used for tests and for
//! running an application without hardware.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::CaptureEvent;
use crate::property::{PropertyId, PropertyValue};
use crate::types::AppInfo;

/// Opaque identifier of one opened channel.
///
/// Issued by the runtime. Equality is identity: two handles compare equal
/// only if they name the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(u64);

impl ConnectionHandle {
    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One opened connection to the runtime.
pub trait PropertyChannel: Send + Sync {
    /// Returns the handle identifying this connection.
    fn handle(&self) -> ConnectionHandle;

    /// Reads a property.
    ///
    /// `arg` is [`PropertyValue::None`] for plain reads; some properties take
    /// a query argument (a data source id, a device GUID, a command).
    fn get_property(
        &self,
        id: PropertyId,
        arg: PropertyValue,
    ) -> BoxFuture<'_, Result<PropertyValue>>;

    /// Writes a property.
    fn set_property(&self, id: PropertyId, value: PropertyValue) -> BoxFuture<'_, Result<()>>;

    /// Opens the device (or device manager) identified by `guid`.
    ///
    /// Only meaningful on the root connection.
    fn open_device(&self, guid: String) -> BoxFuture<'_, Result<Arc<dyn PropertyChannel>>>;

    /// Closes the connection.
    fn close(&self) -> BoxFuture<'_, Result<()>>;
}

impl fmt::Debug for dyn PropertyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyChannel").field(&self.handle()).finish()
    }
}

/// Entry point of a capture runtime.
pub trait CaptureRuntime: Send + Sync {
    /// Opens the root connection with application credentials.
    ///
    /// Every event the runtime raises while the connection is open is sent,
    /// in emission order, to `events`.
    fn open(
        &self,
        app: AppInfo,
        events: mpsc::Sender<CaptureEvent>,
    ) -> BoxFuture<'_, Result<Arc<dyn PropertyChannel>>>;
}

pub use memory::{MemoryRuntime, RuntimeStats};
