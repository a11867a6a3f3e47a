use keyforge_auth::TokenConfig;

#[tokio::main]
async fn main() {
    keyforge_observability::init();

    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret-dev-secret-dev-secret".to_string()
    });
    let issuer = std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "keyforge".to_string());
    let audience =
        std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "keyforge-clients".to_string());

    let config = TokenConfig::new(issuer, audience, secret);
    let app = keyforge_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
