//! Community directory core.
//!
//! Two pieces with real correctness constraints live here:
//!
//! - [`secret`]: stateless, time-limited secret links for email verification
//!   and password reset.
//! - [`search`]: keeps the hosted search index of pages in line with the
//!   PostgreSQL store.
//!
//! Everything else ([`pages`], [`store`], [`config`]) wires those two into
//! the rest of the application.

pub mod config;
pub mod errors;
pub mod models;
pub mod pages;
pub mod search;
pub mod secret;
pub mod store;
pub mod telemetry;
pub mod util;
