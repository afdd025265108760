use actix_web::cookie::Key;
use actix_web::http::header;
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};

use pushkind_dispatch::domain::errors::WorkflowError;
use pushkind_dispatch::domain::variant::WorkflowVariant;
use pushkind_dispatch::routes::error_redirect;

fn flash_framework() -> FlashMessagesFramework {
    let store = CookieMessageStore::builder(Key::from(&[7u8; 64][..])).build();
    FlashMessagesFramework::builder(store).build()
}

#[actix_web::test]
async fn test_workflow_errors_redirect_to_the_workflow_screen() {
    let app = test::init_service(App::new().wrap(flash_framework()).route(
        "/fail",
        web::post().to(|| async {
            error_redirect(WorkflowError::EmptyScanSet, WorkflowVariant::PickLoad)
        }),
    ))
    .await;

    let req = test::TestRequest::post().uri("/fail").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/pick-load");
}

#[actix_web::test]
async fn test_unauthorized_operators_are_sent_to_not_assigned() {
    let app = test::init_service(App::new().wrap(flash_framework()).route(
        "/fail",
        web::post().to(|| async {
            error_redirect(WorkflowError::Unauthorized, WorkflowVariant::Load)
        }),
    ))
    .await;

    let req = test::TestRequest::post().uri("/fail").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/na");
}
