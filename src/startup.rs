use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::account::AccountService;
use crate::auth::TokenService;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::media_client::MediaUploader;
use crate::middleware::RequestLogger;
use crate::routes::{
    change_password, current_user, health_check, login, logout, refresh, register,
    update_account, update_avatar, update_cover_image,
};
use crate::session::SessionController;
use crate::store::CredentialStore;

const MAX_JSON_BYTES: usize = 16 * 1024;
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CredentialStore>,
    uploader: Arc<dyn MediaUploader>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionController::new(
        store.clone(),
        TokenService::new(jwt_config),
    ));
    let accounts = web::Data::new(AccountService::new(store, uploader));

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(|err, _req| {
                AppError::from(ValidationError::MalformedBody(err.to_string())).into()
            });

        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(sessions.clone())
            .app_data(accounts.clone())
            .app_data(json_config)
            .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))

            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1/users")
                    // Public routes
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh-token", web::post().to(refresh))
                    // Routes taking an AuthContext
                    .route("/logout", web::post().to(logout))
                    .route("/change-password", web::post().to(change_password))
                    .route("/current-user", web::get().to(current_user))
                    .route("/update-account", web::patch().to(update_account))
                    .route("/avatar", web::patch().to(update_avatar))
                    .route("/cover-image", web::patch().to(update_cover_image)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
