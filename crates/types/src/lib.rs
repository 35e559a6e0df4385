//! Core types and traits for the wayfare workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! wayfare client SDK, including the error type, session credential types,
//! domain models, the stream-event union, and the credential-store trait.

pub mod error;
pub mod models;
pub mod session;
pub mod stream;
pub mod traits;

pub use error::ApiError;
pub use models::{
    Budget, CreatePlanRequest, CreateVideoRequest, GeneratePlanRequest, PlanDetail, TravelPlan,
    UpdateUserRequest, User, VideoJob, VideoStatus,
};
pub use session::{Session, TokenResponse};
pub use stream::StreamEvent;
pub use traits::{ByteStream, CredentialKey, CredentialStore};
