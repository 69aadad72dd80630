//! Integration tests for signup submission and confirmation.
//!
//! Every test drives the real router through HTTP requests against the
//! in-memory store and recording mailer.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use signup_core::{CountryCode, Domain, Email, LanguageCode, Locale};
use signup_integration_tests::{TestApp, signup_with, valid_signup};
use signup_server::models::NewOrganization;
use signup_server::services::email::{EmailTemplate, MailContent};

fn existing_organization(email: &str) -> NewOrganization {
    NewOrganization {
        name: "Existing".to_string(),
        contact_firstname: "E".to_string(),
        contact_lastname: "X".to_string(),
        contact_email: Email::parse(email).unwrap(),
        language: LanguageCode::parse("de").unwrap(),
        country: CountryCode::parse("DE").unwrap(),
    }
}

fn acme_domain() -> Domain {
    Domain::from_stored("acme.on.seatsurfing.de").unwrap()
}

/// Submit the valid signup and return its confirmation id.
async fn submit(app: &TestApp) -> String {
    let (status, _) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    app.mailer.last_confirm_id().unwrap()
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_valid_signup_creates_pending_signup_and_sends_opt_in() {
    let app = TestApp::new();

    let (status, body) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let signups = app.store.signups();
    assert_eq!(signups.len(), 1);
    let signup = &signups[0];
    assert_eq!(signup.domain.as_str(), "acme.on.seatsurfing.de");
    assert_eq!(signup.email.as_str(), "a@b.com");
    assert_eq!(signup.organization, "Acme");
    assert_eq!(signup.firstname, "A");
    assert_eq!(signup.lastname, "B");
    assert_eq!(signup.country.as_str(), "DE");
    assert_eq!(signup.language.as_str(), "de");
    assert!(signup.password_hash.starts_with("$argon2"));
    assert_ne!(signup.password_hash, "longpass1");
    assert_eq!(signup.id.as_str().len(), 43);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    let mail = &sent[0];
    assert_eq!(mail.to.as_str(), "a@b.com");
    assert_eq!(mail.from.as_str(), "info@seatsurfing.de");
    assert_eq!(mail.locale, Locale::De);
    match &mail.content {
        MailContent::Signup {
            recipient_name,
            recipient_email,
            confirm_id,
            confirm_link,
        } => {
            assert_eq!(recipient_name, "A B");
            assert_eq!(recipient_email, "a@b.com");
            assert_eq!(confirm_id, signup.id.as_str());
            assert!(confirm_link.ends_with(confirm_id.as_str()));
        }
        MailContent::Confirm { .. } => panic!("expected opt-in mail"),
    }

    assert!(app.store.organizations().is_empty());
    assert!(app.store.users().is_empty());
}

#[tokio::test]
async fn test_domain_label_is_lowercased() {
    let app = TestApp::new();

    let (status, _) = app.signup(&signup_with("domain", json!("AcMe"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.store.signups()[0].domain.as_str(),
        "acme.on.seatsurfing.de"
    );
}

#[tokio::test]
async fn test_honeypot_hit_is_silently_ignored() {
    let app = TestApp::new();

    for field in ["firstname", "lastname"] {
        let (status, body) = app.signup(&signup_with(field, json!("bot"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    assert!(app.store.signups().is_empty());
    assert!(app.store.organizations().is_empty());
    assert!(app.store.users().is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_honeypot_does_not_touch_the_store() {
    let app = TestApp::new();
    app.store.fail_lookups(true);

    let (status, _) = app.signup(&signup_with("firstname", json!("bot"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_invalid_honeypot_request_still_fails_validation() {
    let app = TestApp::new();

    let mut body = signup_with("firstname", json!("bot"));
    body["acceptTerms"] = json!(false);
    let (status, _) = app.signup(&body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_domain_taken_by_organization_conflicts() {
    let app = TestApp::new();
    app.store
        .seed_organization(&existing_organization("other@corp.com"), &acme_domain());

    let (status, body) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.is_empty());
    assert!(app.store.signups().is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_email_of_organization_conflicts() {
    let app = TestApp::new();
    let other_domain = Domain::from_stored("other.on.seatsurfing.de").unwrap();
    app.store
        .seed_organization(&existing_organization("a@b.com"), &other_domain);

    let (status, _) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(app.store.signups().is_empty());
}

#[tokio::test]
async fn test_email_of_pending_signup_conflicts() {
    let app = TestApp::new();
    submit(&app).await;

    let (status, _) = app
        .signup(&signup_with("domain", json!("another")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.store.signups().len(), 1);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_pending_signup_does_not_reserve_domain() {
    // Two pending signups for one domain are allowed; confirmation decides.
    let app = TestApp::new();
    submit(&app).await;

    let (status, _) = app
        .signup(&signup_with("email", json!("c@d.com")))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.signups().len(), 2);
}

#[tokio::test]
async fn test_unsupported_country_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.signup(&signup_with("country", json!("US"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
    assert!(app.store.signups().is_empty());
}

#[tokio::test]
async fn test_country_is_case_insensitive() {
    let app = TestApp::new();

    let (status, _) = app.signup(&signup_with("country", json!("at"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.signups()[0].country.as_str(), "AT");
}

#[tokio::test]
async fn test_unsupported_language_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app.signup(&signup_with("language", json!("fr"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.signups().is_empty());
}

#[tokio::test]
async fn test_conflict_is_reported_before_unsupported_country() {
    let app = TestApp::new();
    app.store
        .seed_organization(&existing_organization("other@corp.com"), &acme_domain());

    let (status, _) = app.signup(&signup_with("country", json!("US"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_validation_failures_are_bad_requests() {
    let app = TestApp::new();

    let cases = [
        ("email", json!("not-an-email")),
        ("email", json!("a@b")),
        ("organization", json!("")),
        ("domain", json!("")),
        ("domain", json!("-acme")),
        ("domain", json!("ac.me")),
        ("contactFirstname", json!("")),
        ("contactLastname", json!("")),
        ("password", json!("short")),
        ("country", json!("DEU")),
        ("language", json!("d")),
        ("acceptTerms", json!(false)),
    ];

    for (field, value) in cases {
        let (status, body) = app.signup(&signup_with(field, value.clone())).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "{field} = {value} should be rejected"
        );
        assert!(body.is_empty());
    }

    assert!(app.store.signups().is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let request = axum::http::Request::post("/signup")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = TestApp::new();

    let (status, _) = app.post_empty("/signup").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lookup_failure_is_server_error_not_available() {
    let app = TestApp::new();
    app.store.fail_lookups(true);

    let (status, body) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert!(app.store.signups().is_empty());
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_opt_in_mail_failure_discards_signup() {
    let app = TestApp::new();
    app.mailer.fail(EmailTemplate::Signup);

    let (status, body) = app.signup(&valid_signup()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert!(app.store.signups().is_empty());
}

// =============================================================================
// Confirmation
// =============================================================================

#[tokio::test]
async fn test_confirm_provisions_tenant() {
    let app = TestApp::new();
    let id = submit(&app).await;

    let (status, body) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let organizations = app.store.organizations();
    assert_eq!(organizations.len(), 1);
    let organization = &organizations[0];
    assert_eq!(organization.name, "Acme");
    assert_eq!(organization.contact_firstname, "A");
    assert_eq!(organization.contact_lastname, "B");
    assert_eq!(organization.contact_email.as_str(), "a@b.com");
    assert_eq!(organization.language.as_str(), "de");
    assert_eq!(organization.country.as_str(), "DE");

    let bindings = app.store.domain_bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].domain, acme_domain());
    assert_eq!(bindings[0].organization_id, organization.id);
    assert!(bindings[0].is_primary);

    let users = app.store.users();
    assert_eq!(users.len(), 1);
    let admin = &users[0];
    assert_eq!(admin.user.email, "admin@acme.on.seatsurfing.de");
    assert_eq!(admin.user.organization_id, organization.id);
    assert!(admin.user.org_admin);
    assert!(!admin.user.super_admin);

    assert!(app.store.signups().is_empty());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    match &sent[1].content {
        MailContent::Confirm {
            recipient_name,
            recipient_email,
            username,
        } => {
            assert_eq!(recipient_name, "A B");
            assert_eq!(recipient_email, "a@b.com");
            assert_eq!(username, "admin@acme.on.seatsurfing.de");
        }
        MailContent::Signup { .. } => panic!("expected confirmation mail"),
    }
    assert_eq!(sent[1].to.as_str(), "a@b.com");
}

#[tokio::test]
async fn test_admin_gets_the_signup_password_hash() {
    let app = TestApp::new();
    let id = submit(&app).await;
    let hash = app.store.signups()[0].password_hash.clone();

    app.confirm(&id).await;

    assert_eq!(app.store.users()[0].password_hash, hash);
}

#[tokio::test]
async fn test_confirm_unknown_id_is_not_found() {
    let app = TestApp::new();
    submit(&app).await;

    let (status, body) = app.confirm("does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
    assert_eq!(app.store.signups().len(), 1);
    assert!(app.store.organizations().is_empty());
}

#[tokio::test]
async fn test_confirm_malformed_id_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.confirm("bad%20id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reconfirm_after_success_is_not_found() {
    let app = TestApp::new();
    let id = submit(&app).await;

    assert_eq!(app.confirm(&id).await.0, StatusCode::NO_CONTENT);
    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.organizations().len(), 1);
    assert_eq!(app.store.users().len(), 1);
}

#[tokio::test]
async fn test_domain_claimed_before_confirm_invalidates_signup() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.store
        .seed_organization(&existing_organization("other@corp.com"), &acme_domain());

    let (status, body) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.is_empty());
    assert!(app.store.signups().is_empty());
    assert_eq!(app.store.organizations().len(), 1);
    assert!(app.store.users().is_empty());
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_second_confirmation_for_same_domain_conflicts() {
    let app = TestApp::new();
    let first = submit(&app).await;
    app.signup(&signup_with("email", json!("c@d.com"))).await;
    let second = app.mailer.last_confirm_id().unwrap();
    assert_ne!(first, second);

    assert_eq!(app.confirm(&first).await.0, StatusCode::NO_CONTENT);
    assert_eq!(app.confirm(&second).await.0, StatusCode::CONFLICT);

    assert!(app.store.signups().is_empty());
    assert_eq!(app.store.organizations().len(), 1);
    assert_eq!(app.store.users().len(), 1);
}

#[tokio::test]
async fn test_concurrent_claim_during_provisioning_conflicts() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.store
        .claim_domain_before_next_create(existing_organization("other@corp.com"));

    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(app.store.signups().is_empty());
    assert_eq!(app.store.organizations().len(), 1);
    assert_eq!(
        app.store.organizations()[0].contact_email.as_str(),
        "other@corp.com"
    );
    assert!(app.store.users().is_empty());
}

#[tokio::test]
async fn test_admin_creation_failure_rolls_back_and_can_be_retried() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.store.fail_next_user_create();

    let (status, body) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert!(app.store.organizations().is_empty());
    assert!(app.store.domain_bindings().is_empty());
    assert!(app.store.users().is_empty());
    assert_eq!(app.store.signups().len(), 1);

    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.organizations().len(), 1);
    assert_eq!(app.store.users().len(), 1);
    assert!(app.store.signups().is_empty());
}

#[tokio::test]
async fn test_confirmation_mail_failure_still_succeeds() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.mailer.fail(EmailTemplate::Confirm);

    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.store.signups().is_empty());
    assert_eq!(app.store.organizations().len(), 1);
    assert_eq!(app.store.users().len(), 1);
}

#[tokio::test]
async fn test_signup_delete_failure_after_provisioning_still_succeeds() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.store.fail_signup_delete(true);

    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.organizations().len(), 1);
}

#[tokio::test]
async fn test_confirm_lookup_failure_is_server_error() {
    let app = TestApp::new();
    let id = submit(&app).await;
    app.store.fail_lookups(true);

    let (status, _) = app.confirm(&id).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.store.organizations().is_empty());
    assert_eq!(app.store.signups().len(), 1);
}

// =============================================================================
// Scenario
// =============================================================================

#[tokio::test]
async fn test_full_double_opt_in_scenario() {
    let app = TestApp::new();

    let (status, _) = app
        .signup(&json!({
            "email": "a@b.com",
            "organization": "Acme",
            "domain": "acme",
            "contactFirstname": "A",
            "contactLastname": "B",
            "password": "longpass1",
            "country": "DE",
            "language": "de",
            "acceptTerms": true
        }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.store.signups()[0].domain.as_str(),
        "acme.on.seatsurfing.de"
    );
    assert_eq!(app.mailer.sent()[0].to.as_str(), "a@b.com");

    let id = app.mailer.last_confirm_id().unwrap();
    assert_eq!(app.confirm(&id).await.0, StatusCode::NO_CONTENT);
    assert_eq!(
        app.store.users()[0].user.email,
        "admin@acme.on.seatsurfing.de"
    );

    // The email now belongs to an organization.
    let (status, _) = app
        .signup(&signup_with("domain", json!("acme2")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
