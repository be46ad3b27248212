use crate::helpers::{
    assert_is_redirect_to, assert_password_matches, registration_body, spawn_app, spawn_app_with,
    spawn_app_with_failing_saves, MailerSetup, SaveFailure,
};
use user_manager::domain::Password;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn registration_form_is_rendered() {
    let app = spawn_app().await;

    let response = app.get_registration().await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(response
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains(r#"<form action="/register" method="post">"#));
    for field in ["email", "firstName", "lastName", "password", "conf_password"] {
        assert!(html_page.contains(&format!(r#"name="{}""#, field)));
    }
    assert!(!html_page.contains(r#"class="error""#));
}

#[tokio::test]
async fn valid_registration_redirects_home() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_is_redirect_to(&response, "/");
}

#[tokio::test]
async fn valid_registration_stores_a_hashed_password_and_no_confirmation() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_registration(&registration_body()).await;

    let users = app.repository.users().await;
    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert_eq!(user.email.as_ref(), "a@b.com");
    assert_eq!(user.full_name(), "A B");
    assert!(user.conf_password.is_none());
    assert!(!user.verified);
    match &user.password {
        Password::Hashed(hash) => assert_password_matches(hash, "p"),
        Password::Plain(_) => panic!("A plaintext password reached the repository"),
    }
}

#[tokio::test]
async fn valid_registration_sends_a_single_verification_email() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_registration(&registration_body()).await;

    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
    assert_eq!(body["To"], "A B <a@b.com>");
    assert_eq!(body["Subject"], "Welcome to User Manager, please verify your account");

    let html_body = body["HtmlBody"].as_str().unwrap();
    assert!(html_body.contains("valid for 24 hours"));
    assert!(html_body.contains(r#"href="http://127.0.0.1/verify/"#));

    let user_id = app.repository.users().await[0].id.unwrap();
    let link = app.get_verification_link(email_request);
    let segments: Vec<_> = link.path_segments().unwrap().collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], "verify");
    assert_eq!(segments[1], user_id.to_string());
    assert_eq!(segments[2].len(), 25);
    assert_eq!(link.query(), None);
}

#[tokio::test]
async fn invalid_registrations_rerender_the_form_and_store_nothing() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (
            serde_json::json!({
                "firstName": "A", "lastName": "B", "password": "p", "conf_password": "p"
            }),
            "Please enter a valid email address.",
            "missing email",
        ),
        (
            serde_json::json!({
                "email": "definitely-not-an-email", "firstName": "A", "lastName": "B",
                "password": "p", "conf_password": "p"
            }),
            "Please enter a valid email address.",
            "invalid email",
        ),
        (
            serde_json::json!({
                "email": "a@b.com", "firstName": "", "lastName": "B",
                "password": "p", "conf_password": "p"
            }),
            "Please enter a valid first name.",
            "empty first name",
        ),
        (
            serde_json::json!({
                "email": "a@b.com", "firstName": "A", "lastName": "B",
                "password": "p", "conf_password": "q"
            }),
            "Passwords do not match.",
            "mismatched passwords",
        ),
        (
            serde_json::json!({
                "email": "a@b.com", "firstName": "A", "lastName": "B"
            }),
            "Please choose a password.",
            "missing passwords",
        ),
    ];

    for (body, error_message, description) in test_cases {
        let response = app.post_registration(&body).await;

        assert_eq!(
            response.status().as_u16(),
            200,
            "The API did not re-render the form when the payload had {}.",
            description
        );
        let html_page = response.text().await.unwrap();
        assert!(
            html_page.contains(&format!(r#"<p class="error"><i>{}</i></p>"#, error_message)),
            "The form did not report the error for {}.",
            description
        );
    }

    assert!(app.repository.users().await.is_empty());
}

#[tokio::test]
async fn submitted_values_are_kept_when_the_form_is_rerendered() {
    let app = spawn_app().await;

    let response = app
        .post_registration(&serde_json::json!({
            "email": "a@b.com", "firstName": "Ursula", "lastName": "B",
            "password": "p", "conf_password": "q"
        }))
        .await;

    let html_page = response.text().await.unwrap();
    assert!(html_page.contains(r#"value="a@b.com""#));
    assert!(html_page.contains(r#"value="Ursula""#));
    assert!(!html_page.contains(r#"value="p""#));
}

#[tokio::test]
async fn registering_an_email_twice_is_reported_on_the_form() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;
    assert_is_redirect_to(&response, "/");

    let response = app.post_registration(&registration_body()).await;

    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains("An account with this email address already exists."));
    assert_eq!(app.repository.users().await.len(), 1);
}

#[tokio::test]
async fn registration_without_mail_transport_still_redirects_home() {
    let app = spawn_app_with(MailerSetup::WithoutTransport).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_is_redirect_to(&response, "/");
    assert_eq!(app.repository.users().await.len(), 1);
}

#[tokio::test]
async fn registration_without_mailer_still_redirects_home() {
    let app = spawn_app_with(MailerSetup::Absent).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_is_redirect_to(&response, "/");
    assert_eq!(app.repository.users().await.len(), 1);
}

#[tokio::test]
async fn registration_fails_if_the_verification_email_cannot_be_sent() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn a_notice_is_shown_once_after_registering() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;
    assert_is_redirect_to(&response, "/");

    // Follow the redirect
    let html_page = app.get_home_html().await;
    assert!(html_page.contains("<p class=\"flash\"><i>Thanks for registering. Please check your inbox to verify your account.</i></p>"));

    // Reload the page
    let html_page = app.get_home_html().await;
    assert!(!html_page.contains("Thanks for registering"));
}

#[tokio::test]
async fn forwarding_headers_do_not_change_the_verification_link() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .api_client
        .post(&format!("{}/register", &app.address))
        .header("X-Forwarded-Host", "evil.example")
        .header("X-Forwarded-Proto", "https")
        .header("Forwarded", "host=evil.example;proto=https")
        .form(&registration_body())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_is_redirect_to(&response, "/");

    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
    let html_body = body["HtmlBody"].as_str().unwrap();
    assert!(!html_body.contains("evil.example"));

    let link = app.get_verification_link(email_request);
    assert_eq!(link.scheme(), "http");
}

#[tokio::test]
async fn registration_fails_if_the_user_cannot_be_stored() {
    let app = spawn_app_with_failing_saves(SaveFailure::Database).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_eq!(response.status().as_u16(), 500);
    assert!(app.repository.users().await.is_empty());
}

#[tokio::test]
async fn a_duplicate_detected_while_storing_is_reported_on_the_form() {
    let app = spawn_app_with_failing_saves(SaveFailure::DuplicateEmail).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_registration(&registration_body()).await;

    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains(
        r#"<p class="error"><i>An account with this email address already exists.</i></p>"#
    ));
    assert!(html_page.contains(r#"value="a@b.com""#));
}
