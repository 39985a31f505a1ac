//! # Edu Client
//!
//! Typed REST client for the educational platform API, plus a compatible
//! mock server.
//!
//! ## Features
//!
//! - **Client**: configurable base URL and timeout, bearer token session,
//!   uniform error surface and upload progress reporting
//! - **Resources**: one façade per API area (auth, subjects, learning
//!   blocks, game, analytics, tests)
//! - **Models**: the domain records exchanged with the server
//! - **Mock server**: an axum REST API over an in-memory repository
//!
//! ## Architecture
//!
//! - [`models`]: domain records (users, curriculum, game state, tests, analysis)
//! - [`api`]: request and response payloads, re-exporting [`models`]
//! - [`client`]: [`ApiClient`] transport, session and error types
//! - [`resources`]: per-area façades over [`ApiClient`]
//! - [`db`]: repository traits and the in-memory backend (`local-repo`)
//! - [`services`]: test generation, scoring and analytics (`local-repo`)
//! - [`http`]: axum router and handlers (`http-server`)
//!
//! ## Example
//!
//! ```no_run
//! use edu_client::api::LoginRequest;
//! use edu_client::{ApiClient, ClientConfig, Session};
//!
//! # async fn run() -> edu_client::ClientResult<()> {
//! let client = ApiClient::new(ClientConfig::from_env()?, Session::in_memory())?;
//! let credentials = LoginRequest {
//!     email: "student@demo.cz".into(),
//!     password: "demo".into(),
//! };
//! client.auth().login(&credentials).await?;
//! let subjects = client.subjects().get_all().await?;
//! println!("{} subjects", subjects.len());
//! # Ok(())
//! # }
//! ```

// RepositoryError carries a context for debugging.
#![allow(clippy::result_large_err)]

pub mod api;
pub mod client;
pub mod models;
pub mod resources;

#[cfg(feature = "local-repo")]
pub mod db;

#[cfg(feature = "local-repo")]
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use client::{
    ApiClient, ClientConfig, ClientError, ClientResult, FileTokenStore, MemoryTokenStore,
    Session, TokenStore,
};
