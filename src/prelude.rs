//! Common imports for the handler modules, pulled in as
//! `use crate::prelude::*`.

pub use crate::session::Session;
pub use anyhow::Result;
