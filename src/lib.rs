//! small graphql repository helper
//!
//! this crate sends queries and mutations to a graphql endpoint and decodes
//! the payload nested under the operation's root field, so callers never deal
//! with the `data` envelope. start with [`Repository`] and
//! [`RepositoryConfig`], then use `query`, `mutate`, or `execute`.
//!
//! ## quick start
//!
//! ```no_run
//! use hentities::{Call, Repository, RepositoryConfig};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Repository::new(RepositoryConfig::new("http://localhost:8080/v1/graphql"))?;
//! let users: Vec<User> = repository
//!     .query(
//!         "query Users($limit: Int!) { users(limit: $limit) { id name } }",
//!         Call::new().with_variables(serde_json::json!({"limit": 10})),
//!     )
//!     .await?;
//! println!("{users:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## errors
//!
//! graphql errors following the `extensions.error.{error_code,status_code,metadata}`
//! convention surface as [`Error::StructuredRequest`]; other server errors surface
//! as [`Error::Request`] with the raw payload as metadata.

mod call;
mod client;
mod config;
mod error;
mod graphql;
mod operation;

pub use call::Call;
pub use client::Repository;
pub use config::RepositoryConfig;
pub use error::{Error, Result, DEFAULT_ERROR_STATUS};
pub use graphql::{Envelope, GraphQlRequest, Payload};
pub use operation::{root_field, Operation, OperationKind, TypedOperation};
pub use tokio_util::sync::CancellationToken;
