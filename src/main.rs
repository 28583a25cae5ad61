use std::sync::Arc;

use anyhow::Context;
use portfolio_guard::{
    build_api_route_filter, handle_auth_errors, init_tracing, seed_admin, with_auth, Auth,
    InMemoryCredentialStore, Settings, Username,
};
use serde_json::json;
use tracing::info;
use warp::{path, Filter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load().context("failed to load settings")?;
    info!(?settings, "starting portfolio auth service");

    let auth = Auth::new(settings.auth_config(Arc::new(InMemoryCredentialStore::new())));

    let outcome = seed_admin(&auth, &settings)
        .await
        .context("failed to seed admin user")?;
    info!(?outcome, "admin seeding finished");

    let admin_me = path!("api" / "admin" / "me")
        .and(warp::get())
        .and(with_auth(&auth))
        .map(|username: Username| warp::reply::json(&json!({ "username": username })));

    let all_routes = build_api_route_filter(&auth)
        .or(admin_me)
        .recover(handle_auth_errors)
        .with(warp::trace::request());

    info!(addr = %settings.bind_addr, "listening");
    warp::serve(all_routes).run(settings.bind_addr).await;

    Ok(())
}
