//! Request and response shapes of the BUSMATE REST API.
//!
//! Field names follow the API's camelCase JSON. Optional fields tolerate
//! being absent.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either coordinate is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), Error> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::Validation(format!(
            "latitude must be within [-90, 90], got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::Validation(format!(
            "longitude must be within [-180, 180], got {longitude}"
        )));
    }
    Ok(())
}

// ── Bus stops ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub is_accessible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStopRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub is_accessible: bool,
}

// ── Routes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub stop_id: String,
    pub stop_order: u32,
    #[serde(default)]
    pub distance_from_start_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub route_group_id: Option<String>,
    #[serde(default)]
    pub start_stop_id: Option<String>,
    #[serde(default)]
    pub end_stop_id: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub route_stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroupRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Schedules ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStop {
    pub stop_id: String,
    pub stop_order: u32,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub route_id: String,
    #[serde(default)]
    pub schedule_type: Option<String>,
    #[serde(default)]
    pub effective_start_date: Option<String>,
    #[serde(default)]
    pub effective_end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub schedule_stops: Vec<ScheduleStop>,
}

// ── Location tracking ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationValidationRequest {
    pub bus_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl LocationValidationRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the bus id is blank or a coordinate
    /// is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.bus_id.trim().is_empty() {
            return Err(Error::Validation("bus id is required".into()));
        }
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusLocation {
    pub bus_id: String,
    #[serde(default)]
    pub trip_id: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
}

// ── Broadcast messaging ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetAudience {
    AllUsers,
    Passengers,
    Conductors,
    Timekeepers,
    FleetOperators,
    MotOfficers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessageRequest {
    pub title: String,
    pub body: String,
    pub target_audiences: Vec<TargetAudience>,
    #[serde(default)]
    pub priority: MessagePriority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<OffsetDateTime>,
}

impl BroadcastMessageRequest {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        target_audiences: Vec<TargetAudience>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            target_audiences,
            priority: MessagePriority::default(),
            route_ids: Vec::new(),
            province: None,
            scheduled_at: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_route_ids(mut self, route_ids: Vec<String>) -> Self {
        self.route_ids = route_ids;
        self
    }

    #[must_use]
    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    #[must_use]
    pub fn with_scheduled_at(mut self, at: OffsetDateTime) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title or body is blank, or no
    /// audience is targeted.
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("broadcast title is required".into()));
        }
        if self.body.trim().is_empty() {
            return Err(Error::Validation("broadcast body is required".into()));
        }
        if self.target_audiences.is_empty() {
            return Err(Error::Validation(
                "broadcast needs at least one target audience".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessageResponse {
    pub notification_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recipient_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub target_audiences: Vec<TargetAudience>,
    #[serde(default)]
    pub priority: Option<MessagePriority>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

// ── Users ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub account_status: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub fleet_size: Option<u32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}
