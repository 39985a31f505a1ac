//! Data Transfer Objects for the HTTP API.
//!
//! Request and response bodies are shared with the client and live in
//! [`crate::api`]; only server-specific bodies are defined here.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    Acknowledgement, ApiError, AuthResponse, GenerateTestRequest, LeaderboardQuery, LoginRequest,
    RegisterRequest, SubmitTestRequest, TestResultsQuery, TokenResponse,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Repository health ("ok", "unavailable" or an error description)
    pub repository: String,
}
