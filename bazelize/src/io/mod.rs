//! I/O helpers for bazelize.

pub mod manifests;
pub mod process;
pub mod scaffold;
