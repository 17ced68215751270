//! FunctionAdapter implementations for memsweep
//!
//! The engine treats the remote transport as an injected capability; this
//! crate provides the concrete implementations. Currently:
//!
//! - [`HttpAdapter`] — a generic HTTP control-plane adapter

#![warn(missing_docs)]
#![warn(clippy::all)]

mod http;

pub use http::{HttpAdapter, DURATION_HEADER};
