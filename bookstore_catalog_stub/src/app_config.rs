use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api/v1")
                .service(web::resource("/admin/auth/login").route(web::post().to(handlers::login)))
                .service(
                    web::resource("/admin/books")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::resource("/admin/books/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book))
                        .route(web::delete().to(handlers::delete_book)),
                )
                .service(web::resource("/admin/upload").route(web::post().to(handlers::upload)))
                .service(
                    web::resource("/categories")
                        .route(web::get().to(handlers::get_all_categories))
                        .route(web::post().to(handlers::add_category)),
                )
                .service(
                    web::resource("/categories/{category_id}")
                        .route(web::get().to(handlers::get_category))
                        .route(web::put().to(handlers::update_category))
                        .route(web::delete().to(handlers::delete_category)),
                )
                .service(
                    web::resource("/age-groups")
                        .route(web::get().to(handlers::get_all_age_groups))
                        .route(web::post().to(handlers::add_age_group)),
                )
                .service(
                    web::resource("/age-groups/{age_group_id}")
                        .route(web::get().to(handlers::get_age_group))
                        .route(web::put().to(handlers::update_age_group))
                        .route(web::delete().to(handlers::delete_age_group)),
                )
                .service(
                    web::resource("/transactions")
                        .route(web::get().to(handlers::get_all_transactions)),
                )
                .service(
                    web::resource("/transactions/{transaction_id}/refund")
                        .route(web::post().to(handlers::refund_transaction)),
                ),
        );
}
