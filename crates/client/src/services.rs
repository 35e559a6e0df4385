//! Typed wrappers over the REST surface.
//!
//! Each service borrows the shared [`ApiClient`], so every call here gets the
//! same credential attachment and refresh-and-retry handling.

use crate::gateway::{ApiClient, ApiRequest};
use std::sync::Arc;
use wayfare_types::traits::Result;
use wayfare_types::{
    CreatePlanRequest, CreateVideoRequest, TravelPlan, UpdateUserRequest, User, VideoJob,
};

/// Profile operations on `/api/users/me`.
pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetches the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn get_profile(&self) -> Result<User> {
        self.api.get("/api/users/me").await
    }

    /// Applies a partial profile update; `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn update_profile(&self, update: &UpdateUserRequest) -> Result<User> {
        self.api
            .patch("/api/users/me", serde_json::to_value(update)?)
            .await
    }
}

/// CRUD operations on `/api/plans`.
pub struct PlanService {
    api: Arc<ApiClient>,
}

impl PlanService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Lists the authenticated user's plans.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn list(&self) -> Result<Vec<TravelPlan>> {
        self.api.get("/api/plans").await
    }

    /// Fetches a single plan with its itinerary.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn get(&self, id: u64) -> Result<TravelPlan> {
        self.api.get(&format!("/api/plans/{id}")).await
    }

    /// Creates a plan.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn create(&self, request: &CreatePlanRequest) -> Result<TravelPlan> {
        self.api
            .post("/api/plans", serde_json::to_value(request)?)
            .await
    }

    /// Replaces a plan's editable fields.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn update(&self, id: u64, request: &CreatePlanRequest) -> Result<TravelPlan> {
        self.api
            .patch(&format!("/api/plans/{id}"), serde_json::to_value(request)?)
            .await
    }

    /// Deletes a plan.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.api.delete(&format!("/api/plans/{id}")).await
    }
}

/// Video-compilation job operations on `/api/videos`.
pub struct VideoService {
    api: Arc<ApiClient>,
}

impl VideoService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Lists the authenticated user's video jobs.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn list(&self) -> Result<Vec<VideoJob>> {
        self.api.get("/api/videos").await
    }

    /// Fetches a single video job.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn get(&self, id: u64) -> Result<VideoJob> {
        self.api.get(&format!("/api/videos/{id}")).await
    }

    /// Submits a video-compilation job. Every submission carries an
    /// `Idempotency-Key` header; pass `key` to retry a prior submission
    /// safely, or `None` to mint a fresh key.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn create(
        &self,
        request: &CreateVideoRequest,
        key: Option<String>,
    ) -> Result<VideoJob> {
        let key = key.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.api
            .send(
                ApiRequest::post("/api/videos", serde_json::to_value(request)?)
                    .header("Idempotency-Key", key),
            )
            .await
    }
}

/// Unauthenticated status endpoints.
pub struct HealthService {
    api: Arc<ApiClient>,
}

impl HealthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Probes `/actuator/health` and returns the raw status document.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.api.get("/actuator/health").await
    }

    /// Fetches the service overview document.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`wayfare_types::ApiError`] on failure.
    pub async fn overview(&self) -> Result<serde_json::Value> {
        self.api.get("/api/overview").await
    }
}
