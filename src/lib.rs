//! # capture-session
//!
//! Session manager and event router for barcode scanner capture runtimes.
//!
//! The capture runtime (device enumeration, transports, decoding) lives
//! outside this crate. This library owns one connection to it, tracks the
//! devices and device managers that come and go, and routes runtime events
//! to whichever application component currently wants them.
//!
//! ## Features
//!
//! - Reference-counted open/close of one runtime connection
//! - Observer stack with per-capability notifications and arrival replay
//! - Typed property accessors driven by one table
//! - Ordered delivery of notifications, inline or through a queue
//! - In-memory runtime for tests and hardware-free runs
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use capture_session::{
//!     AppInfo, DecodedData, DecodedDataObserver, Device, MemoryRuntime, Observer, ResultCode,
//!     Session,
//! };
//!
//! struct Printer;
//!
//! impl Observer for Printer {
//!     fn decoded_data_observer(self: Arc<Self>) -> Option<Arc<dyn DecodedDataObserver>> {
//!         Some(self)
//!     }
//! }
//!
//! impl DecodedDataObserver for Printer {
//!     fn decoded_data(&self, data: &DecodedData, device: &Device, _result: ResultCode) {
//!         println!("{}: {:?}", device.name(), data.as_str());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), capture_session::Error> {
//!     let session = Session::new(Arc::new(MemoryRuntime::new()));
//!     let token = session.push_observer(Arc::new(Printer));
//!
//!     session
//!         .open(&AppInfo::new("developer-id", "com.example.app", "app-key"))
//!         .await?;
//!     println!("runtime version {}", session.version().await?);
//!
//!     // ... devices arrive, data is decoded ...
//!
//!     session.close().await?;
//!     if let Some(token) = token {
//!         session.pop_observer(token);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`channel`] - Runtime boundary traits and the in-memory runtime
//! - [`property`] - Property ids, values and the accessor table
//! - [`types`] - Data structures (device identity, status, settings)
//! - [`event`] - Runtime events and delivery contexts
//! - [`observer`] - Observer capabilities and the observer stack
//! - [`registry`] - Connected devices keyed by connection handle
//! - [`device`] - [`Device`] and [`DeviceManager`] accessors
//! - [`session`] - The [`Session`] itself

pub mod channel;
pub mod device;
pub mod error;
pub mod event;
pub mod observer;
pub mod property;
pub mod registry;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use channel::{CaptureRuntime, ConnectionHandle, MemoryRuntime, PropertyChannel, RuntimeStats};
pub use device::{Device, DeviceManager};
pub use error::{Error, Result, ResultCode};
pub use event::{CaptureEvent, DeliveryContext, DeliveryQueue, EventKind, EventPayload};
pub use observer::{
    ButtonsObserver, DecodedDataObserver, DeviceManagerPresenceObserver, DevicePresenceObserver,
    DiscoveryObserver, ErrorObserver, Observer, ObserverStack, ObserverToken, PowerObserver,
};
pub use property::{ObjectMap, Property, PropertyId, PropertyType, PropertyValue};
pub use registry::Registry;
pub use session::{Session, SessionConfig};
pub use types::{
    AppInfo, BatteryLevel, BluetoothAddress, ButtonsState, ConfirmationBeep, ConfirmationLed,
    ConfirmationMode, ConfirmationRumble, DataAcknowledgment, DataConfirmation, DataSource,
    DataSourceId, DataSourceStatus, DecodedData, DeviceClass, DeviceInfo, DeviceType,
    InterfaceType, LocalDecodeAction, Notifications, PowerState, SoftScanStatus, StandConfig,
    Trigger, Version,
};
