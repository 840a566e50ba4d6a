use axum::routing::{delete, get, patch, post};
use axum::{Extension, Router};
use task_distribution::directory::handlers::{
    handle_create_agent, handle_delete_agent, handle_list_agents, handle_restore_agent,
};
use task_distribution::directory::registry::PrincipalDirectory;
use task_distribution::ingestion::handlers::handle_upload;
use task_distribution::query::handlers::{
    handle_admin_tasks, handle_agent_tasks, handle_agent_tasks_for_admin, handle_batch_detail,
    handle_history, handle_latest_lists,
};
use task_distribution::storage::handlers::handle_update_task_status;
use task_distribution::storage::store::BatchStore;

use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "127.0.0.1:8080".parse()?;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    // 1. Shared state:
    let store = Arc::new(BatchStore::new());
    let directory = Arc::new(PrincipalDirectory::new());

    // 2. HTTP Router:
    let app = Router::new()
        .route("/api/uploads", post(handle_upload))
        .route("/api/uploads/latest", get(handle_latest_lists))
        .route("/api/uploads/history", get(handle_history))
        .route("/api/uploads/history/:timestamp", get(handle_batch_detail))
        .route("/api/tasks", get(handle_admin_tasks))
        .route("/api/agents", get(handle_list_agents).post(handle_create_agent))
        .route("/api/agents/:id", delete(handle_delete_agent))
        .route("/api/agents/:id/restore", patch(handle_restore_agent))
        .route("/api/agents/:id/tasks", get(handle_agent_tasks_for_admin))
        .route("/api/agents/tasks", get(handle_agent_tasks))
        .route("/api/agents/tasks/update", patch(handle_update_task_status))
        .layer(Extension(store))
        .layer(Extension(directory));

    // 3. Start HTTP server:
    tracing::info!("Task distribution service listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
