//! Core types for the WildFly operator.
//!
//! - [`crd`]: the `Wildfly` custom resource (declarative desired state)
//! - [`config`]: operator configuration and the defaults applied to omitted spec fields
//! - [`protocol`]: port transport protocol
//! - [`error`]: typed errors for configuration and schema handling

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod crd;
pub mod error;
pub mod protocol;

pub use config::{ControllerConfig, OperatorConfig, OperatorDefaults, PortDefault};
pub use crd::{Wildfly, WildflyPortProto, WildflySpec, WildflyStatus, crd_yaml};
pub use error::{Error, Result};
pub use protocol::Protocol;
