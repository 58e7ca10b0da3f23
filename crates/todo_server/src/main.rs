//! Todo server entry point.
//!
//! Reads configuration from the environment (and an optional `.env`),
//! checks the JSON store, then serves the API until Ctrl+C.

use log::info;
use todo_core::{core_version, init_logging, JsonFileStore, TodoService, TodoStore};
use todo_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let store = JsonFileStore::new(&config.json_path);
    match store.load() {
        Ok(todos) => info!(
            "event=store_open module=server status=ok count={} path={}",
            todos.len(),
            config.json_path.display()
        ),
        Err(err) if err.is_missing() => info!(
            "event=store_open module=server status=empty path={}",
            config.json_path.display()
        ),
        Err(err) => return Err(err.into()),
    }

    let app = build_router(AppState::new(TodoService::new(store)), &config.static_dir);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={} version={}",
        listener.local_addr()?,
        core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_stop module=server status=error error={err}");
    }
}
