//! Application layer: repository facades composing the domain rules.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod seed;
