use crate::{
    api::{department, employee, leave_request, team},
    auth::handlers,
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::anyhow;
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<Limiter>,
    register: Arc<Limiter>,
    protected: Arc<Limiter>,
}

impl Limiters {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            register: Arc::new(build_limiter(config.rate_register_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = (60_000 / u64::from(requests_per_min.max(1))).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {} per minute", requests_per_min))?;
    Ok(Governor::new(&cfg))
}

/// Malformed bodies, paths and queries are reported like any other validation failure.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    extractor_configs(cfg);

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/auth")
                    // public
                    .service(
                        web::resource("/register")
                            .wrap(limiters.register.clone())
                            .route(web::post().to(handlers::register)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(limiters.login.clone())
                            .route(web::post().to(handlers::login)),
                    )
                    // bearer token required from here on
                    .service(
                        web::resource("/update")
                            .wrap(limiters.protected.clone())
                            .route(web::put().to(handlers::update_self)),
                    )
                    .service(
                        web::resource("/update/{employee_id}")
                            .wrap(limiters.protected.clone())
                            .route(web::put().to(handlers::admin_update)),
                    )
                    .service(
                        web::resource("/delete/{employee_id}")
                            .wrap(limiters.protected.clone())
                            .route(web::delete().to(handlers::delete)),
                    )
                    .service(
                        web::resource("/admin/{employee_id}")
                            .wrap(limiters.protected.clone())
                            .route(web::post().to(handlers::grant_admin))
                            .route(web::delete().to(handlers::revoke_admin)),
                    ),
            )
            .service(
                web::scope("/department")
                    .wrap(limiters.protected.clone())
                    .route("/list", web::get().to(department::list_departments))
                    .route("/add", web::post().to(department::create_department))
                    .route(
                        "/delete/{department_id}",
                        web::delete().to(department::delete_department),
                    )
                    .route(
                        "/leaves/{department_id}",
                        web::get().to(department::department_leaves),
                    ),
            )
            .service(
                web::scope("/team")
                    .wrap(limiters.protected.clone())
                    .route("/list", web::get().to(team::list_teams))
                    .route("/add", web::post().to(team::create_team))
                    .route("/delete/{team_id}", web::delete().to(team::delete_team))
                    .route("/leaves/{team_id}", web::get().to(team::team_leaves)),
            )
            .service(
                web::scope("/employee")
                    .wrap(limiters.protected.clone())
                    // /employee/list must be registered before /employee/{id}
                    .route("/list", web::get().to(employee::list_employees))
                    .route(
                        "/leaves/{year}/{month}",
                        web::get().to(employee::monthly_leaves),
                    )
                    .route("/{employee_id}", web::get().to(employee::employee_leaves)),
            )
            .service(
                web::scope("/leave_request")
                    .wrap(limiters.protected.clone())
                    // /leave_request
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::list_own))
                            .route(web::post().to(leave_request::submit)),
                    )
                    // /leave_request/{id}
                    .service(
                        web::resource("/{leave_id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::edit_leave))
                            .route(web::delete().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/approve")
                            .route(web::post().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{leave_id}/reject")
                            .route(web::post().to(leave_request::reject_leave)),
                    ),
            ),
    );
}
