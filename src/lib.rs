//! Biolink session core.
//!
//! Manages the lifecycle of a single wireless biosignal-acquisition device
//! session: discovery, connection, streaming start/stop, and delivery of
//! decoded data frames to subscribers.  The physical radio link is an
//! external collaborator behind the [`app::ports::Transport`] trait;
//! presentation layers consume the typed notifications published by
//! [`app::service::SessionController`].

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod frame;
pub mod fsm;
pub mod level;
pub mod registry;

pub mod error;

pub use app::service::SessionController;
pub use config::AcquisitionConfig;
pub use error::{Error, Result};
pub use frame::{DataFrame, RawRecord};
pub use fsm::ConnectionState;
pub use registry::{DeviceIdentity, DeviceRegistry};
