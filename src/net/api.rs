//! Session and user endpoints.
//!
//! ERROR HANDLING
//! ==============
//! Login is the one call made with the bootstrap credential, so its 401 is a
//! plain rejection (wrong credentials or admin token), never a forced logout.
//! Every other call here goes through the session-aware path in `client`.

use serde_json::Value;

use super::client::{ApiClient, ApiRequest};
use super::envelope::Operation;
use super::types::{CompanyEmployee, Credentials, LoginResponse, Page, PasswordReset, UserProfile};
use crate::error::ApiError;
use crate::state::auth::EndReason;

pub const ADMIN_LOGIN_ENDPOINT: &str = "login_admin";
pub const LOGOUT_ENDPOINT: &str = "user/logout";
pub const PROFILE_ENDPOINT: &str = "profile";
pub const PASSWORD_RESET_ENDPOINT: &str = "user/update_password";
pub const COMPANY_EMPLOYEES_ENDPOINT: &str = "user/company";

const LOGIN: Operation = Operation::new("log in", "Login service").with_overrides(&[
    (400, "Invalid credentials. Please check your email and password."),
    (401, "Unauthorized. Please verify your admin token or credentials."),
    (403, "Access denied. Your account does not have permission."),
    (404, "Login service not found. Please try again later."),
]);
const LOGOUT: Operation = Operation::new("log out", "Logout service");
const PROFILE: Operation = Operation::new("view the profile", "Profile");
const RESET_PASSWORD: Operation = Operation::new("update the password", "User")
    .with_overrides(&[(400, "Invalid password. Please check your current and new password.")]);
const EMPLOYEES: Operation = Operation::new("view company employees", "Company");

const LOGGED_OUT: &str = "Logged out successfully";
const PASSWORD_UPDATED: &str = "Password updated successfully";

/// `POST login_admin` with the bootstrap credential.
///
/// A success body that is empty or not JSON still counts as a login; the
/// caller then stores the placeholder token.
///
/// # Errors
///
/// `Connectivity`, or `Rejected` for non-2xx or `hasError: true`.
pub async fn login_admin(client: &ApiClient, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
    let request = ApiRequest::post(ADMIN_LOGIN_ENDPOINT)
        .json(credentials)?
        .bootstrap()
        .context(LOGIN);
    let raw = client.execute(request).await?;

    let response = raw.body.as_ref().map_or_else(LoginResponse::default, LoginResponse::from_body);

    if response.has_error {
        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| LOGIN.fallback_message(raw.status));
        return Err(ApiError::Rejected { status: raw.status, message });
    }

    Ok(response)
}

/// `POST user/logout`. Does not touch local state.
///
/// # Errors
///
/// Any request error; callers clear the local session regardless.
pub async fn logout_user(client: &ApiClient) -> Result<(), ApiError> {
    client
        .send::<Value>(ApiRequest::post(LOGOUT_ENDPOINT).empty_ok(LOGGED_OUT).context(LOGOUT))
        .await
        .map(|_| ())
}

/// `GET profile` for the signed-in admin.
///
/// # Errors
///
/// Any request error, or `InvalidResponse` when `data` is missing.
pub async fn user_profile(client: &ApiClient) -> Result<UserProfile, ApiError> {
    client
        .send::<UserProfile>(ApiRequest::get(PROFILE_ENDPOINT).context(PROFILE))
        .await?
        .into_data()
}

/// `PATCH user/update_password`, then end the session so the admin signs in
/// again with the new password.
///
/// The session is ended only after the server confirms the change.
///
/// # Errors
///
/// `InvalidInput` for a blank password, otherwise any request error. The
/// session is left alone on failure.
pub async fn reset_password(client: &ApiClient, old_password: &str, new_password: &str) -> Result<String, ApiError> {
    if old_password.is_empty() || new_password.is_empty() {
        return Err(ApiError::InvalidInput("current and new password are required".into()));
    }
    let body = PasswordReset { old_password: old_password.to_owned(), password: new_password.to_owned() };
    let request = ApiRequest::patch(PASSWORD_RESET_ENDPOINT)
        .json(&body)?
        .empty_ok(PASSWORD_UPDATED)
        .context(RESET_PASSWORD);

    let envelope = client.send::<Value>(request).await?;
    let message = envelope.message().unwrap_or(PASSWORD_UPDATED).to_owned();

    client.session().end(EndReason::PasswordChanged);
    Ok(message)
}

/// `GET user/company/{id}`: employees of one company.
///
/// # Errors
///
/// Any request error, or `InvalidResponse` for a malformed page.
pub async fn company_employees(client: &ApiClient, company_id: i64) -> Result<Page<CompanyEmployee>, ApiError> {
    client
        .send::<Vec<CompanyEmployee>>(
            ApiRequest::get(format!("{COMPANY_EMPLOYEES_ENDPOINT}/{company_id}")).context(EMPLOYEES),
        )
        .await?
        .into_page()
}
