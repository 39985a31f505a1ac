//! Mock HTTP server for the educational platform API.
//!
//! Serves the same routes the client requests, backed by any
//! [`FullRepository`](crate::db::repository::FullRepository).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Bearer authentication (AuthSession extractor)          │
//! │  - JSON / multipart parsing                               │
//! │  - CORS, compression, error envelopes                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Test generation and scoring                            │
//! │  - Learning analytics, leaderboard                        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository (in-memory, optional demo seed)        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::{create_router, API_PREFIX};
pub use state::AppState;
