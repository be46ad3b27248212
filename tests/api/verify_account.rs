use crate::helpers::{assert_is_redirect_to, registration_body, spawn_app, TestApp};
use user_manager::repository::UserRepository;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn register_and_get_verification_link(app: &TestApp) -> reqwest::Url {
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_registration(&registration_body()).await;

    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    app.get_verification_link(email_request)
}

#[tokio::test]
async fn clicking_on_the_verification_link_verifies_the_account() {
    let app = spawn_app().await;
    let link = register_and_get_verification_link(&app).await;

    let response = app.get(link.as_str()).await;

    assert_is_redirect_to(&response, "/");
    let account = app
        .repository
        .find_by_email("a@b.com")
        .await
        .unwrap()
        .expect("The registered account is missing");
    assert!(account.verified);

    let html_page = app.get_home_html().await;
    assert!(html_page.contains("<p class=\"flash\"><i>Your account has been verified.</i></p>"));
}

#[tokio::test]
async fn verification_links_only_work_once() {
    let app = spawn_app().await;
    let link = register_and_get_verification_link(&app).await;

    let response = app.get(link.as_str()).await;
    assert_is_redirect_to(&response, "/");

    let response = app.get(link.as_str()).await;
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn a_wrong_token_is_rejected_with_401() {
    let app = spawn_app().await;
    let mut link = register_and_get_verification_link(&app).await;
    let user_id = app.repository.users().await[0].id.unwrap();
    link.set_path(&format!("/verify/{}/not-the-right-token", user_id));

    let response = app.get(link.as_str()).await;

    assert_eq!(response.status().as_u16(), 401);
    let account = app.repository.find_by_id(user_id).await.unwrap().unwrap();
    assert!(!account.verified);
}

#[tokio::test]
async fn an_unknown_account_is_rejected_with_401() {
    let app = spawn_app().await;

    let response = app
        .get(&format!("{}/verify/{}/sometoken", app.address, uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn a_malformed_id_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .get(&format!("{}/verify/not-a-uuid/sometoken", app.address))
        .await;

    assert_eq!(response.status().as_u16(), 404);
}
