//! `persistence` crate — storage of workflow definitions.
//!
//! The editor talks to storage only through [`WorkflowRepository`]. Records
//! carry the definition as raw JSON; shaping it into nodes and edges is the
//! `graph` crate's job.

pub mod error;
pub mod file;
pub mod memory;
pub mod models;
pub mod repository;

pub use error::PersistenceError;
pub use file::FileRepository;
pub use memory::InMemoryRepository;
pub use models::{SaveAck, WorkflowRecord};
pub use repository::WorkflowRepository;
