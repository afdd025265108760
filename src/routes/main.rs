use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, render_template};
use tera::Tera;

use crate::domain::variant::WorkflowVariant;
use crate::routes::error_redirect;
use crate::services::authorize;

#[get("/")]
/// Landing page listing the dispatch-bay workflows.
pub async fn show_index(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(err) = authorize(&user, WorkflowVariant::Pick) {
        return error_redirect(err, WorkflowVariant::Pick);
    }

    let mut context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );
    let variants: Vec<_> = WorkflowVariant::ALL
        .iter()
        .map(|variant| (variant.as_str(), variant.title()))
        .collect();
    context.insert("variants", &variants);

    render_template(&tera, "main/index.html", &context)
}
