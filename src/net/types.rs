//! Wire types for the admin API.
//!
//! Field names follow the server's camelCase JSON. Everything the dashboard
//! does not strictly need is optional so that schema drift on the server does
//! not turn into `InvalidResponse` errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::envelope::{display_value, is_error_flag};
use crate::error::ApiError;

/// Token stored when a login succeeds without returning any token.
pub const PLACEHOLDER_TOKEN: &str = "session";

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` when either field is blank.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::InvalidInput("email is required".into()));
        }
        if self.password.is_empty() {
            return Err(ApiError::InvalidInput("password is required".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by `POST login_admin`, read field by field.
///
/// The login endpoint is loose about its shape, so nothing here can fail: a
/// field of the wrong type is treated as absent.
#[derive(Debug, Clone, Default)]
pub struct LoginResponse {
    pub has_error: bool,
    pub message: Option<String>,
    access_token: Option<String>,
    user: Option<Value>,
    session: Option<Value>,
}

impl LoginResponse {
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let data = body.get("data").filter(|d| d.is_object());
        let session = data.and_then(|d| d.get("session")).filter(|v| !v.is_null());
        let access_token = data
            .and_then(|d| non_empty_str(d.get("accessToken")))
            .or_else(|| non_empty_str(body.get("accessToken")))
            .or_else(|| non_empty_str(session.and_then(|s| s.get("token"))))
            .map(str::to_owned);

        Self {
            has_error: is_error_flag(body.get("hasError")),
            message: body.get("message").and_then(display_value),
            access_token,
            user: data.and_then(|d| d.get("user")).filter(|v| !v.is_null()).cloned(),
            session: session.cloned(),
        }
    }

    /// Session token: `data.accessToken`, then `accessToken`, then
    /// `data.session.token`, then [`PLACEHOLDER_TOKEN`]. Empty or non-string
    /// values are skipped.
    #[must_use]
    pub fn token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(PLACEHOLDER_TOKEN)
    }

    #[must_use]
    pub fn user(&self) -> Option<&Value> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Value> {
        self.session.as_ref()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|t| !t.is_empty())
}

/// Body for `PATCH user/update_password`.
#[derive(Clone, Serialize)]
pub struct PasswordReset {
    pub old_password: String,
    pub password: String,
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset").finish_non_exhaustive()
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_rider: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEmployee {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub company_id: i64,
    #[serde(default)]
    pub is_delete: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_rider: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub previous_page: Option<u32>,
    #[serde(default)]
    pub total_items: u64,
}

/// A list payload plus its pagination metadata, when the server sent any.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Option<PageMeta>,
}

// =============================================================================
// COMPANIES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub industry_id: Option<i64>,
    #[serde(default)]
    pub size_id: Option<i64>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub approve: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub owner: Option<CompanyOwner>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub size: Option<CompanySize>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyOwner {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub website_url: String,
    pub industry_id: i64,
    pub size_id: i64,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub owner_password: String,
}

impl std::fmt::Debug for NewCompany {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCompany")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("owner_email", &self.owner_email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySize {
    pub id: i64,
    pub size_text: String,
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub total_companies: u64,
    pub active_rides: u64,
    pub monthly_rides: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAdminDashboardMeta {
    pub active_employees: u64,
    pub active_rides: u64,
    pub monthly_rides: u64,
    #[serde(default)]
    pub oxygen_saved: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesMeta {
    pub active_companies: u64,
    #[serde(default)]
    pub sizes: Vec<SizeCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeCount {
    pub size_text: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceFilter {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

impl PerformanceFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for PerformanceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown performance filter '{other}' (expected daily, weekly, monthly or yearly)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPerformance {
    pub filter: String,
    #[serde(default)]
    pub data: Vec<CompanyRides>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRides {
    pub company_name: String,
    pub rides: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub total_rides: u64,
    #[serde(default)]
    pub completed_rides: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub leaderboard_rank: Option<u32>,
}

/// Optional leaderboard filters. Unset (or zero/empty) values are not sent.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardParams {
    pub page: Option<u32>,
    pub industry_id: Option<i64>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl LeaderboardParams {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(industry_id) = self.industry_id.filter(|id| *id > 0) {
            pairs.push(("industryId", industry_id.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub receiver_id: Option<i64>,
    pub msg: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
