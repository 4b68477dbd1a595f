#[cfg(not(target_arch = "wasm32"))]
use actix_web::{web, App, HttpServer};
#[cfg(not(target_arch = "wasm32"))]
use chess_clock::{config::ServerConfig, routes};
#[cfg(not(target_arch = "wasm32"))]
use log::info;

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    info!(
        "Serving chess clock from {} at http://{}",
        config.static_dir.display(),
        config.bind_addr
    );

    let bind_addr = config.bind_addr.clone();
    let data = web::Data::new(config);

    HttpServer::new(move || {
        let data = data.clone();
        App::new()
            .app_data(data.clone())
            .configure(|cfg| routes::configure_routes(cfg, &data))
    })
    .bind(bind_addr)?
    .run()
    .await
}

// The page itself runs the library build; there is nothing to host from inside the browser.
#[cfg(target_arch = "wasm32")]
fn main() {}
