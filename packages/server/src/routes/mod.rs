use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(article_routes())
        .merge(trade_routes())
        .merge(user_routes())
        .route("/images/{*key}", get(handlers::image::serve_image))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::handshake))
        .routes(routes!(handlers::auth::refresh))
        .routes(routes!(handlers::auth::logout))
}

fn article_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::article::create_article))
        .routes(routes!(
            handlers::article::get_article,
            handlers::article::update_article,
            handlers::article::delete_article
        ))
        .routes(routes!(handlers::article::toggle_like))
}

fn trade_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::trade::place_offer,
            handlers::trade::list_offers
        ))
        .routes(routes!(handlers::trade::withdraw_offer))
        .routes(routes!(handlers::trade::select_offer))
        .routes(routes!(handlers::trade::complete_trade))
        .routes(routes!(handlers::trade::unselect_offer))
        .routes(routes!(handlers::trade::reopen_trade))
        .routes(routes!(handlers::trade::create_review))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::me))
        .routes(routes!(handlers::user::get_profile))
        .routes(routes!(handlers::user::list_user_sales))
        .routes(routes!(handlers::user::list_my_sales))
        .routes(routes!(handlers::user::list_my_likes))
        .routes(routes!(handlers::user::list_my_offers))
        .routes(routes!(handlers::user::list_my_buys))
}
