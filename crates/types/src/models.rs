//! Domain models for the travel-planning API.
//!
//! All wire formats use camelCase field names; timestamps travel as ISO-8601
//! strings and are not interpreted client-side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub name: String,
    /// Identity provider the account was created through (`google`, `apple`, …).
    pub provider: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A travel plan with its per-day itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub details: Vec<PlanDetail>,
    pub created_at: String,
    pub updated_at: String,
}

/// One itinerary entry within a [`TravelPlan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetail {
    pub id: u64,
    pub day: u32,
    pub location: String,
    pub activity: String,
}

/// Processing state of a video-compilation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A server-side video-compilation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoJob {
    pub id: u64,
    pub user_id: u64,
    pub status: VideoStatus,
    pub photo_urls: Vec<String>,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub idempotency_key: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for creating or updating a plan through the CRUD endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
}

/// Partial profile update; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for submitting a video-compilation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub photo_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Spending tier for streamed plan generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Budget {
    type Err = crate::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(crate::ApiError::Validation(format!(
                "unknown budget '{other}' (expected low, medium, or high)"
            ))),
        }
    }
}

/// Input to the streamed plan-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Defaults to [`Budget::Medium`] on the wire when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const PLAN_JSON: &str = r#"{
        "id": 3,
        "userId": 11,
        "title": "Jeju Getaway",
        "startDate": "2025-05-01",
        "endDate": "2025-05-03",
        "details": [
            {"id": 1, "day": 1, "location": "Jeju City", "activity": "Hallasan hike"}
        ],
        "createdAt": "2025-04-20T10:00:00Z",
        "updatedAt": "2025-04-20T10:00:00Z"
    }"#;

    #[test]
    fn test_travel_plan_decode() {
        let plan: TravelPlan = serde_json::from_str(PLAN_JSON).unwrap();
        assert_eq!(plan.id, 3);
        assert_eq!(plan.user_id, 11);
        assert_eq!(plan.details.len(), 1);
        assert_eq!(plan.details[0].activity, "Hallasan hike");
    }

    #[test]
    fn test_travel_plan_details_default_empty() {
        let json = r#"{
            "id": 1, "userId": 2, "title": "t",
            "startDate": "2025-01-01", "endDate": "2025-01-02",
            "createdAt": "x", "updatedAt": "x"
        }"#;
        let plan: TravelPlan = serde_json::from_str(json).unwrap();
        assert!(plan.details.is_empty());
    }

    #[test]
    fn test_video_status_wire_names() {
        let s: VideoStatus = serde_json::from_str("\"PROCESSING\"").unwrap();
        assert_eq!(s, VideoStatus::Processing);
        assert_eq!(
            serde_json::to_string(&VideoStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
    }

    #[test]
    fn test_video_job_optional_url() {
        let json = r#"{
            "id": 1, "userId": 2, "status": "PENDING",
            "photoUrls": ["https://cdn.example.com/a.jpg"],
            "template": "classic", "idempotencyKey": "k1",
            "createdAt": "x", "updatedAt": "x"
        }"#;
        let job: VideoJob = serde_json::from_str(json).unwrap();
        assert!(job.video_url.is_none());
        assert_eq!(job.photo_urls.len(), 1);
    }

    #[test]
    fn test_update_user_skips_none() {
        let req = UpdateUserRequest {
            name: Some("New Name".into()),
            email: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("name"));
        assert!(!json.contains("email"));
    }

    #[test]
    fn test_budget_default_is_medium() {
        assert_eq!(Budget::default(), Budget::Medium);
        assert_eq!(
            serde_json::to_string(&Budget::default()).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn test_budget_from_str() {
        assert_eq!(Budget::from_str("low").unwrap(), Budget::Low);
        assert_eq!(Budget::from_str("high").unwrap(), Budget::High);
        assert!(Budget::from_str("lavish").is_err());
    }

    #[test]
    fn test_generate_request_camel_case() {
        let req = GeneratePlanRequest {
            location: "Busan".into(),
            start_date: "2025-06-01".into(),
            end_date: "2025-06-04".into(),
            budget: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("startDate"));
        assert!(json.contains("endDate"));
        assert!(!json.contains("budget"));
    }
}
