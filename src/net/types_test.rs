use super::*;
use serde_json::json;

fn login(value: Value) -> LoginResponse {
    LoginResponse::from_body(&value)
}

// =============================================================================
// LoginResponse::token
// =============================================================================

#[test]
fn token_from_data_access_token() {
    let resp = login(json!({"data": {"accessToken": "abc123"}, "hasError": false}));
    assert_eq!(resp.token(), "abc123");
}

#[test]
fn data_access_token_wins_over_top_level() {
    let resp = login(json!({"data": {"accessToken": "inner"}, "accessToken": "outer"}));
    assert_eq!(resp.token(), "inner");
}

#[test]
fn token_from_top_level_access_token() {
    let resp = login(json!({"accessToken": "outer", "data": {}}));
    assert_eq!(resp.token(), "outer");
}

#[test]
fn token_from_nested_session_token() {
    let resp = login(json!({"data": {"session": {"token": "sess-1"}}}));
    assert_eq!(resp.token(), "sess-1");
}

#[test]
fn empty_tokens_are_skipped() {
    let resp = login(json!({"data": {"accessToken": "", "session": {"token": "sess-2"}}, "accessToken": ""}));
    assert_eq!(resp.token(), "sess-2");
}

#[test]
fn placeholder_when_no_token_anywhere() {
    assert_eq!(login(json!({})).token(), PLACEHOLDER_TOKEN);
    assert_eq!(login(json!({"data": {"session": {"id": 9}}})).token(), PLACEHOLDER_TOKEN);
    assert_eq!(LoginResponse::default().token(), "session");
}

#[test]
fn user_and_session_payloads_exposed() {
    let resp = login(json!({"data": {"user": {"name": "Ada"}, "session": {"token": "t"}}}));
    assert_eq!(resp.user(), Some(&json!({"name": "Ada"})));
    assert_eq!(resp.session(), Some(&json!({"token": "t"})));
}

#[test]
fn null_payloads_are_absent() {
    let resp = login(json!({"data": {"user": null, "session": null}}));
    assert_eq!(resp.user(), None);
    assert_eq!(resp.session(), None);
}

// =============================================================================
// LoginResponse::from_body
// =============================================================================

#[test]
fn bare_string_body_is_a_successful_login() {
    let resp = login(json!("OK"));
    assert!(!resp.has_error);
    assert_eq!(resp.token(), PLACEHOLDER_TOKEN);
    assert_eq!(resp.user(), None);
}

#[test]
fn non_object_data_is_ignored() {
    let resp = login(json!({"data": [1]}));
    assert!(!resp.has_error);
    assert_eq!(resp.token(), PLACEHOLDER_TOKEN);
}

#[test]
fn null_has_error_is_success() {
    let resp = login(json!({"hasError": null, "data": {"accessToken": "x"}}));
    assert!(!resp.has_error);
    assert_eq!(resp.token(), "x");
}

#[test]
fn only_literal_true_has_error_fails() {
    assert!(login(json!({"hasError": true})).has_error);
    assert!(!login(json!({"hasError": "true"})).has_error);
    assert!(!login(json!({"hasError": 1})).has_error);
}

#[test]
fn numeric_access_token_is_skipped() {
    let resp = login(json!({"data": {"accessToken": 12345}}));
    assert_eq!(resp.token(), PLACEHOLDER_TOKEN);

    let resp = login(json!({"data": {"accessToken": 12345}, "accessToken": "outer"}));
    assert_eq!(resp.token(), "outer");
}

#[test]
fn non_string_login_message_is_rendered() {
    let resp = login(json!({"hasError": true, "message": {"code": 7}}));
    assert_eq!(resp.message.as_deref(), Some(r#"{"code":7}"#));
}

// =============================================================================
// Credentials
// =============================================================================

#[test]
fn credentials_require_email_and_password() {
    assert!(Credentials::new("admin@poolyfi.com", "secret").validate().is_ok());
    assert!(matches!(Credentials::new("  ", "secret").validate(), Err(ApiError::InvalidInput(_))));
    assert!(matches!(Credentials::new("admin@poolyfi.com", "").validate(), Err(ApiError::InvalidInput(_))));
}

#[test]
fn credentials_debug_redacts_password() {
    let debug = format!("{:?}", Credentials::new("admin@poolyfi.com", "hunter2"));
    assert!(debug.contains("admin@poolyfi.com"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn credentials_serialize_as_email_password() {
    let value = serde_json::to_value(Credentials::new("a@b.c", "pw")).unwrap();
    assert_eq!(value, json!({"email": "a@b.c", "password": "pw"}));
}

#[test]
fn password_reset_uses_snake_case_and_redacts() {
    let body = PasswordReset { old_password: "old".into(), password: "new".into() };
    assert_eq!(serde_json::to_value(&body).unwrap(), json!({"old_password": "old", "password": "new"}));
    assert!(!format!("{body:?}").contains("old"));
}

// =============================================================================
// Companies
// =============================================================================

#[test]
fn company_list_item_parses_with_nested_refs() {
    let company: Company = serde_json::from_value(json!({
        "id": 4,
        "name": "Acme",
        "websiteUrl": "https://acme.test",
        "isActive": true,
        "industry": {"id": 1, "name": "Logistics"},
        "size": {"id": 2, "sizeText": "11-50"},
        "owner": {"id": 9, "name": "Wile", "email": "wile@acme.test", "phone": "555"}
    }))
    .unwrap();

    assert_eq!(company.website_url.as_deref(), Some("https://acme.test"));
    assert!(company.is_active);
    assert_eq!(company.size.unwrap().size_text, "11-50");
    assert_eq!(company.owner.unwrap().name, "Wile");
}

#[test]
fn company_update_omits_unset_fields() {
    let update = CompanyUpdate { name: Some("Acme 2".into()), size_id: Some(3), ..CompanyUpdate::default() };
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Acme 2", "sizeId": 3}));
}

#[test]
fn new_company_debug_hides_owner_password() {
    let company = NewCompany {
        name: "Acme".into(),
        address: "1 Road".into(),
        email: "hq@acme.test".into(),
        phone: "555".into(),
        website_url: "https://acme.test".into(),
        industry_id: 1,
        size_id: 2,
        owner_name: "Wile".into(),
        owner_email: "wile@acme.test".into(),
        owner_phone: "556".into(),
        owner_password: "roadrunner".into(),
    };
    assert!(!format!("{company:?}").contains("roadrunner"));
    let value = serde_json::to_value(&company).unwrap();
    assert_eq!(value["ownerPassword"], "roadrunner");
    assert_eq!(value["websiteUrl"], "https://acme.test");
}

// =============================================================================
// Dashboard helpers
// =============================================================================

#[test]
fn performance_filter_parses_and_prints() {
    assert_eq!("Monthly".parse::<PerformanceFilter>().unwrap(), PerformanceFilter::Monthly);
    assert_eq!(PerformanceFilter::default().as_str(), "weekly");
    assert!("hourly".parse::<PerformanceFilter>().is_err());
}

#[test]
fn leaderboard_params_skip_unset_and_falsy_values() {
    let params = LeaderboardParams { page: Some(2), industry_id: Some(0), search: Some(String::new()), limit: Some(10) };
    assert_eq!(params.query_pairs(), vec![("page", "2".to_string()), ("limit", "10".to_string())]);
    assert!(LeaderboardParams::default().query_pairs().is_empty());
}

#[test]
fn leaderboard_params_include_search_and_industry() {
    let params =
        LeaderboardParams { page: None, industry_id: Some(7), search: Some("acme".into()), limit: None };
    assert_eq!(
        params.query_pairs(),
        vec![("industryId", "7".to_string()), ("search", "acme".to_string())]
    );
}

#[test]
fn page_meta_defaults_missing_fields() {
    let meta: PageMeta = serde_json::from_value(json!({"totalPages": 3, "nextPage": null})).unwrap();
    assert_eq!(meta.total_pages, 3);
    assert_eq!(meta.next_page, None);
    assert_eq!(meta.total_items, 0);
}
