//! API Module
//!
//! HTTP inspection server for one storage namespace.
//!
//! # Endpoints
//! - `PUT /set` - Store a value
//! - `GET /get/:key` - Retrieve a live value
//! - `DELETE /del/:key` - Delete a key
//! - `GET /keys` - List keys and total size
//! - `DELETE /clear` - Clear the namespace
//! - `GET /stats` - Storage statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
