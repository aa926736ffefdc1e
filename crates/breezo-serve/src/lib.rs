//! HTTP front end for a loaded [`breezo_model::DiagnosisModel`].
//!
//! The model is loaded before the listener is bound and shared read-only
//! across requests. Predictions run on Tokio's blocking pool.

mod error;
mod request;
mod server;

pub use error::ServeError;
pub use request::PredictRequest;
pub use server::{AppState, router, serve};
