use std::{error::Error, net::SocketAddr};

use axum_server::tls_rustls::RustlsConfig;
use tidy::TidyConfig;
use tracing::{error, info, Level};

mod error;
mod routes;

#[tokio::main]
async fn main() {
    match TidyConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("アプリケーションエラー: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("アプリケーションエラー: {}", error)
        }
    }
}

async fn serve(config: &TidyConfig) -> Result<(), Box<dyn Error>> {
    let addr = config.web.addr.parse::<SocketAddr>()?;
    let app = routes::router(routes::AppState::new(config.booking.clone()));
    match (&config.web.tls_cert, &config.web.tls_key) {
        (Some(cert), Some(key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!("HTTPS で待ち受けます: {}", addr);
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            info!("HTTP で待ち受けます: {}", addr);
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}
