use actix_files as fs;
use actix_web::{web, Result};

use crate::config::ServerConfig;

/// HTTP handler for the clock page
pub async fn index(config: web::Data<ServerConfig>) -> Result<fs::NamedFile> {
    Ok(fs::NamedFile::open_async(config.static_dir.join("index.html")).await?)
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &ServerConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(fs::Files::new("/static", config.static_dir.clone()));
}
