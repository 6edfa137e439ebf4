use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use shala::auth::rate_limit::LoginThrottle;
use shala::config::AppConfig;
use shala::repo::PgRepository;
use shala::uploads::UploadStore;
use shala::workflow::identity;
use shala::{db, routes};

fn session_key(configured: Option<&str>) -> Key {
    // Load from SESSION_KEY for persistent sessions across restarts
    match configured {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
    let repo = PgRepository::new(pool);

    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);
    uploads.ensure_dir().await.map_err(std::io::Error::other)?;

    identity::bootstrap_admin(
        &repo,
        &config.admin_username,
        &config.admin_email,
        &config.admin_password,
    )
    .await
    .map_err(std::io::Error::other)?;

    let secret_key = session_key(config.session_key.as_deref());
    let throttle = LoginThrottle::new();
    let cookie_secure = config.cookie_secure;

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(uploads.clone()))
            .app_data(web::Data::new(throttle.clone()))
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(routes::configure::<PgRepository>)
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
