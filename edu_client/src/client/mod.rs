//! HTTP client core.
//!
//! One [`ApiClient`] per process carries the base URL, the timeout, the JSON
//! default headers, and the [`Session`]. The resource APIs in
//! [`crate::resources`] are thin façades over its `get`/`post`/`put`/
//! `delete`/`upload_file` methods.
//!
//! ```no_run
//! use edu_client::client::{ApiClient, ClientConfig, Session};
//!
//! # async fn example() -> Result<(), edu_client::client::ClientError> {
//! let session = Session::in_memory().on_unauthorized(|login| {
//!     eprintln!("session expired, go to {login}");
//! });
//! let client = ApiClient::new(ClientConfig::from_env()?, session)?;
//! let subjects = client.subjects().get_all().await?;
//! # let _ = subjects;
//! # Ok(())
//! # }
//! ```

pub mod api_client;
pub mod config;
pub mod error;
pub mod path;
pub mod session;
pub mod upload;

pub use api_client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, RequestContext};
pub use path::ApiPath;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore, AUTH_TOKEN_KEY};
pub use upload::{progress_percentage, ProgressFn, UploadFile};
