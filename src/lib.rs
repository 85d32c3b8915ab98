//! Publishing core for the Tribuna news portal.
//!
//! The crate holds the rules a sports-league portal actually argues about:
//! which posts the public sees at a given instant, which categories a role
//! may publish into, how slugs stay unique, and how the
//! draft/scheduled/published workflow settles timestamps. Persistence is an
//! injected boundary — an in-memory map for tests and demos, the portal
//! REST API in production — and the facades recompute uniqueness against a
//! fresh snapshot immediately before every write, an accepted trade-off for
//! a low-concurrency internal tool.
//!
//! Scheduled publication needs no background job: visibility is a pure
//! function of `(status, published_at, now)`, evaluated at read time.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
