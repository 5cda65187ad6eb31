//! Dashboard metrics, leaderboard and notifications.

use super::client::{ApiClient, ApiRequest};
use super::envelope::Operation;
use super::types::{
    CompaniesMeta, CompanyPerformance, DashboardMeta, LeaderboardEntry, LeaderboardParams, Notification, Page,
    PerformanceFilter, SubAdminDashboardMeta,
};
use crate::error::ApiError;

pub const SUPERADMIN_META_ENDPOINT: &str = "get_superadmin_dashboard_meta";
pub const SUB_ADMIN_META_ENDPOINT: &str = "sub_admin_dashboard_meta";
pub const COMPANIES_META_ENDPOINT: &str = "get_companies_meta";
pub const COMPANY_PERFORMANCE_ENDPOINT: &str = "company_performance";
pub const LEADERBOARD_ENDPOINT: &str = "superadmin_leaderboard";
pub const NOTIFICATIONS_ENDPOINT: &str = "notifications";

pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 5;
pub const DEFAULT_NOTIFICATION_PAGE: u32 = 1;

const DASHBOARD: Operation = Operation::new("view dashboard data", "Dashboard data");
const COMPANIES_META: Operation = Operation::new("view company metadata", "Company metadata");
const PERFORMANCE: Operation = Operation::new("view company performance", "Performance data");
const LEADERBOARD: Operation = Operation::new("view the leaderboard", "Leaderboard");
const NOTIFICATIONS: Operation = Operation::new("view notifications", "Notifications");

/// Platform-wide totals for the super admin.
///
/// # Errors
///
/// Any request error.
pub async fn superadmin_meta(client: &ApiClient) -> Result<DashboardMeta, ApiError> {
    client
        .send::<DashboardMeta>(ApiRequest::get(SUPERADMIN_META_ENDPOINT).context(DASHBOARD))
        .await?
        .into_data()
}

/// Totals for one company's admin.
///
/// # Errors
///
/// Any request error.
pub async fn sub_admin_meta(client: &ApiClient, company_id: i64) -> Result<SubAdminDashboardMeta, ApiError> {
    client
        .send::<SubAdminDashboardMeta>(
            ApiRequest::get(format!("{SUB_ADMIN_META_ENDPOINT}/{company_id}")).context(DASHBOARD),
        )
        .await?
        .into_data()
}

/// Company counts by size. The server puts these in `metaData`, not `data`.
///
/// # Errors
///
/// Any request error, or `InvalidResponse` when `metaData` is missing.
pub async fn companies_meta(client: &ApiClient) -> Result<CompaniesMeta, ApiError> {
    let envelope = client
        .send::<serde_json::Value>(ApiRequest::get(COMPANIES_META_ENDPOINT).context(COMPANIES_META))
        .await?;
    envelope
        .meta::<CompaniesMeta>()?
        .ok_or_else(|| ApiError::InvalidResponse { detail: "response has no metaData".into() })
}

/// # Errors
///
/// Any request error.
pub async fn company_performance(
    client: &ApiClient,
    filter: PerformanceFilter,
) -> Result<CompanyPerformance, ApiError> {
    client
        .send::<CompanyPerformance>(
            ApiRequest::get(COMPANY_PERFORMANCE_ENDPOINT)
                .query("filter", filter.as_str())
                .context(PERFORMANCE),
        )
        .await?
        .into_data()
}

/// Ranked companies. Only the filters set in `params` are sent.
///
/// # Errors
///
/// Any request error.
pub async fn leaderboard(client: &ApiClient, params: &LeaderboardParams) -> Result<Page<LeaderboardEntry>, ApiError> {
    let request = params
        .query_pairs()
        .into_iter()
        .fold(ApiRequest::get(LEADERBOARD_ENDPOINT), |req, (key, value)| req.query(key, value))
        .context(LEADERBOARD);
    client
        .send::<Vec<LeaderboardEntry>>(request)
        .await?
        .into_page()
}

/// Latest notifications; `None` uses the dashboard defaults (5 per page, page 1).
///
/// # Errors
///
/// Any request error.
pub async fn notifications(
    client: &ApiClient,
    limit: Option<u32>,
    page: Option<u32>,
) -> Result<Page<Notification>, ApiError> {
    let request = ApiRequest::get(NOTIFICATIONS_ENDPOINT)
        .query("limit", limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT))
        .query("page", page.unwrap_or(DEFAULT_NOTIFICATION_PAGE))
        .context(NOTIFICATIONS);
    client
        .send::<Vec<Notification>>(request)
        .await?
        .into_page()
}
