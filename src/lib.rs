//! # Presigned Redirect Server
//!
//! Presigned Redirect Server provides the building blocks for a two-unit
//! content delivery setup: a signer service that issues time-limited
//! signed urls for objects in a private store, and a distribution front
//! that redirects viewer requests to those signed urls at the edge.
//!
//! ## Request flow
//!
//! A viewer request reaches the distribution front, which invokes the
//! edge redirect step exactly once. The edge step resolves the signer
//! endpoint from a parameter store under a fixed, well-known name, calls
//! the signer, and answers the viewer with a `302` carrying the signed
//! query. The re-request with the signed query passes through to the
//! cache and origin logic.
//!
//! ## Design
//!
//! In order to provide flexibility, this crate is built around four core
//! abstractions.
//!
//! - ObjectCatalog: This trait is responsible for deciding which object
//!   keys may be signed.
//! - UrlSigner: This trait is responsible for producing the signed urls
//!   that grant read access to the data.
//! - ParameterStore: This trait is responsible for resolving the signer
//!   endpoint at the edge, where injected configuration is unavailable.
//! - OriginFetcher: This trait is responsible for fetching responses
//!   from the object store origin.
//!

#![warn(missing_docs)]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod edge;
pub mod front;
pub mod params;
pub mod signer;

pub mod error;
mod extract;
mod response;
pub mod router;
pub mod state;

pub use response::PresignedUrlResponse;
