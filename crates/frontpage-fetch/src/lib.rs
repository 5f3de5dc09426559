//! Frontpage Fetch Library
//!
//! The content fetch gateway: the single path from the rendering layer to the
//! content store.
//!
//! Each call picks a [`FetchMode`] from the caller's draft-mode state, fails
//! fast when draft mode has no token, selects the direct or CDN-backed
//! [`Transport`], and returns the store's decoded result. Cache tags ride along
//! on the outbound [`QueryRequest`] untouched.
//!
//! # Modules
//!
//! - [`query`] - Caller-side query description
//! - [`request`] - Fetch modes, perspectives, tokens and the outbound request
//! - [`transport`] - Transport trait and the HTTP implementation
//! - [`gateway`] - The gateway itself

pub mod error;
pub mod gateway;
pub mod query;
pub mod request;
pub mod transport;

pub use error::{FetchError, Result, TransportError};
pub use gateway::ContentGateway;
pub use query::{ContentQuery, QueryParams};
pub use request::{AuthToken, FetchMode, Perspective, QueryRequest, TransportChoice};
pub use transport::{HttpTransport, Transport};
