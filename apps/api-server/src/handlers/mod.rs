//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod categories;
mod comments;
mod dashboard;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/health-check", web::get().to(health::health_check))
        .route("/", web::get().to(blog::index))
        .route("/blog/{slug}", web::get().to(blog::show))
        .route("/category/{slug}", web::get().to(blog::category))
        // Auth routes
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/me", web::get().to(auth::me)),
        )
        // Authenticated dashboard routes
        .route("/dashboard", web::get().to(dashboard::index))
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::index))
                .route("", web::post().to(posts::store))
                .route("/{id}", web::get().to(posts::show))
                .route("/{id}/edit", web::get().to(posts::edit))
                .route("/{id}", web::put().to(posts::update))
                .route("/{id}", web::delete().to(posts::destroy)),
        )
        .service(
            web::scope("/categories")
                .route("", web::get().to(categories::index))
                .route("", web::post().to(categories::store))
                .route("/{id}", web::get().to(categories::show))
                .route("/{id}", web::put().to(categories::update))
                .route("/{id}", web::delete().to(categories::destroy)),
        )
        .service(
            web::scope("/comments")
                .route("", web::get().to(comments::index))
                .route("", web::post().to(comments::store))
                .route("/{id}", web::put().to(comments::update))
                .route("/{id}", web::delete().to(comments::destroy)),
        );
}
