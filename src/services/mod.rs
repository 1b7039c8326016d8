//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session and bank-link logic so route handlers can
//! stay focused on protocol translation and auth plumbing.

pub mod link;
pub mod session;
