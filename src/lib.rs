//! Client-side engine of a code-snippet manager: validation, snippet/tag
//! reconciliation over a many-to-many association, two-step fetch-join,
//! in-memory view derivation, and a mirror of the auth service's session.
//!
//! The hosted backend appears as two traits, [`store::SnippetStore`] and
//! [`auth::AuthBackend`], with PostgreSQL and in-memory implementations of
//! each. [`Client`] ties one signed-in principal to a store and an auth
//! service; the pure layers ([`validation`], [`views`], [`export`]) work on
//! plain data and never touch a backend.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod models;
pub mod session;
pub mod store;
pub mod tags;
pub mod validation;
pub mod views;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use session::{SessionMirror, SessionStatus};
