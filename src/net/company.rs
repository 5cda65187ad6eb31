//! Company management and catalog endpoints.

use serde_json::{Value, json};

use super::client::{ApiClient, ApiRequest};
use super::envelope::Operation;
use super::types::{Company, CompanySize, CompanyUpdate, Industry, NewCompany};
use crate::error::ApiError;

pub const COMPANY_ENDPOINT: &str = "company";
pub const COMPANY_STATUS_ENDPOINT: &str = "company/status/update";
pub const INDUSTRIES_ENDPOINT: &str = "industries";
pub const COMPANY_SIZES_ENDPOINT: &str = "company_sizes";

const LIST: Operation = Operation::new("view companies", "Companies");
const GET: Operation = Operation::new("view this company", "Company");
const CREATE: Operation = Operation::new("create a company", "Company")
    .with_overrides(&[(400, "Invalid company data. Please check all required fields.")]);
const UPDATE: Operation = Operation::new("update this company", "Company");
const DELETE: Operation = Operation::new("delete this company", "Company");
const SET_STATUS: Operation = Operation::new("update the company status", "Company");
const INDUSTRIES: Operation = Operation::new("view industries", "Industries");
const SIZES: Operation = Operation::new("view company sizes", "Company sizes");

fn company_path(id: i64) -> String {
    format!("{COMPANY_ENDPOINT}/{id}")
}

/// # Errors
///
/// Any request error, or `InvalidResponse` when `data` is missing.
pub async fn list(client: &ApiClient) -> Result<Vec<Company>, ApiError> {
    client
        .send::<Vec<Company>>(ApiRequest::get(COMPANY_ENDPOINT).context(LIST))
        .await?
        .into_data()
}

/// # Errors
///
/// Any request error; a missing company is `Rejected` with status 404.
pub async fn get(client: &ApiClient, id: i64) -> Result<Company, ApiError> {
    client
        .send::<Company>(ApiRequest::get(company_path(id)).context(GET))
        .await?
        .into_data()
}

/// Create a company together with its owner account.
///
/// # Errors
///
/// Any request error.
pub async fn create(client: &ApiClient, company: &NewCompany) -> Result<Company, ApiError> {
    client
        .send::<Company>(ApiRequest::post(COMPANY_ENDPOINT).json(company)?.context(CREATE))
        .await?
        .into_data()
}

/// Update the fields set in `update`; unset fields are not sent.
///
/// # Errors
///
/// Any request error.
pub async fn update(client: &ApiClient, id: i64, update: &CompanyUpdate) -> Result<Company, ApiError> {
    client
        .send::<Company>(ApiRequest::put(company_path(id)).json(update)?.context(UPDATE))
        .await?
        .into_data()
}

/// # Errors
///
/// Any request error.
pub async fn delete(client: &ApiClient, id: i64) -> Result<String, ApiError> {
    const DELETED: &str = "Company deleted successfully";
    let envelope = client
        .send::<Value>(ApiRequest::delete(company_path(id)).empty_ok(DELETED).context(DELETE))
        .await?;
    Ok(envelope.message().unwrap_or(DELETED).to_owned())
}

/// Activate or deactivate a company.
///
/// # Errors
///
/// Any request error.
pub async fn set_status(client: &ApiClient, id: i64, is_active: bool) -> Result<String, ApiError> {
    const UPDATED: &str = "Company status updated successfully";
    let request = ApiRequest::put(format!("{COMPANY_STATUS_ENDPOINT}/{id}"))
        .json(&json!({ "isActive": is_active }))?
        .empty_ok(UPDATED)
        .context(SET_STATUS);
    let envelope = client.send::<Value>(request).await?;
    Ok(envelope.message().unwrap_or(UPDATED).to_owned())
}

/// # Errors
///
/// Any request error.
pub async fn industries(client: &ApiClient) -> Result<Vec<Industry>, ApiError> {
    client
        .send::<Vec<Industry>>(ApiRequest::get(INDUSTRIES_ENDPOINT).context(INDUSTRIES))
        .await?
        .into_data()
}

/// # Errors
///
/// Any request error.
pub async fn sizes(client: &ApiClient) -> Result<Vec<CompanySize>, ApiError> {
    client
        .send::<Vec<CompanySize>>(ApiRequest::get(COMPANY_SIZES_ENDPOINT).context(SIZES))
        .await?
        .into_data()
}
