use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models::{admin, blog, portfolio};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::admin::list_admins,
        handlers::admin::create_admin,
        handlers::admin::update_admin,
        handlers::admin::delete_admin,
        handlers::admin::reset_admin_password,
        handlers::blog::list_articles,
        handlers::blog::get_article,
        handlers::blog::create_article,
        handlers::blog::update_article,
        handlers::blog::delete_article,
        handlers::portfolio::list_items,
        handlers::portfolio::get_item,
        handlers::portfolio::create_item,
        handlers::portfolio::update_item,
        handlers::portfolio::delete_item,
    ),
    components(
        schemas(
            handlers::Health,
            admin::AdminProfile,
            admin::LoginRequest,
            admin::LoginResponse,
            admin::CreateAdminRequest,
            admin::UpdateAdminRequest,
            admin::ForgotPasswordRequest,
            admin::ForgotPasswordResponse,
            admin::ResetPasswordRequest,
            admin::AdminResetPasswordRequest,
            admin::MessageResponse,
            blog::BlogArticle,
            blog::CreateArticleRequest,
            blog::UpdateArticleRequest,
            portfolio::PortfolioItem,
            portfolio::TagsInput,
            portfolio::CreatePortfolioRequest,
            portfolio::UpdatePortfolioRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "cms-backend", description = "Content management and admin authentication API"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
