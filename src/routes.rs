use crate::{
    api::{admin, attendance, documents, roster},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Key-protected routes; every handler resolves the X-Access-Key header
    // through the TeamIdentity extractor
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::submit))
                            .route(web::get().to(attendance::list_records)),
                    )
                    // /attendance/pending
                    .service(
                        web::resource("/pending").route(web::get().to(attendance::pending)),
                    ),
            )
            .service(
                web::scope("/roster")
                    // /roster
                    .service(
                        web::resource("")
                            .route(web::get().to(roster::list_roster))
                            .route(web::post().to(roster::add_employee)),
                    )
                    // /roster/{team}
                    .service(web::resource("/{team}").route(web::put().to(roster::replace_team)))
                    // /roster/{team}/{name}
                    .service(
                        web::resource("/{team}/{name}")
                            .route(web::delete().to(roster::remove_employee)),
                    ),
            )
            .service(web::resource("/documents").route(web::put().to(documents::upload)))
            .service(
                web::scope("/admin")
                    // /admin/ledger
                    .service(
                        web::resource("/ledger")
                            .route(web::post().to(admin::overwrite_ledger))
                            .route(web::delete().to(admin::purge_ledger)),
                    )
                    // /admin/policies
                    .service(
                        web::resource("/policies")
                            .route(web::get().to(admin::get_policies))
                            .route(web::put().to(admin::update_policies)),
                    ),
            ),
    );
}
