//! HTTP client for the wayfare travel-planning API.
//!
//! Two transports live here: the request gateway ([`ApiClient`]), which
//! attaches stored credentials and transparently coordinates token refresh
//! across concurrent requests, and the plan-generation stream client
//! ([`PlanStreamClient`]), which decodes the SSE event stream emitted by the
//! LLM service. Typed service wrappers over the REST surface sit on top of
//! the gateway.

pub mod auth;
pub mod gateway;
pub mod services;
pub mod streaming;

pub use auth::{AuthService, IdentityProvider};
pub use gateway::{ApiClient, ApiRequest};
pub use services::{HealthService, PlanService, UserService, VideoService};
pub use streaming::{PlanStreamClient, StreamCallbacks};
