//! Port traits separating the domain from its collaborators.

pub mod config_port;
pub mod journal_port;
