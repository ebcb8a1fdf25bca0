//! `nodes` crate — the node-kind catalog and typed per-kind settings.
//!
//! The wire format only knows three coarse categories. The editor works with
//! finer-grained kinds; [`catalog`] is the fixed lookup between the two and
//! [`settings`] decodes a kind's open config map into a typed view.

pub mod catalog;
pub mod error;
pub mod settings;

pub use catalog::{KindSpec, NodeCategory};
pub use error::UnknownCategory;
pub use settings::NodeSettings;
