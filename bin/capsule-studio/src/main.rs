//! # capsule-studio Binary
//!
//! The entry point that assembles the editor core based on compile-time
//! features, restores any saved session, and performs the initial loads.

use std::sync::Arc;

use cs_controller::{CommentPanel, MediaLibrary, SuggestionController};
use cs_core::share::parse_capsule_path;

// Feature-gated imports: swap the backends without touching the core
#[cfg(feature = "db-sqlite")]
use cs_db_sqlite::{SqliteCommentStore, SqliteSuggestionStore};

#[cfg(feature = "storage-local")]
use cs_storage_local::LocalMediaStore;

#[cfg(feature = "session-local")]
use cs_session_local::FileSessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:capsule_studio.db".to_string());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

    // 1. Persistence
    #[cfg(feature = "db-sqlite")]
    let pool = cs_db_sqlite::connect(&database_url).await?;
    #[cfg(feature = "db-sqlite")]
    let suggestions = Arc::new(SqliteSuggestionStore::new(pool.clone()));
    #[cfg(feature = "db-sqlite")]
    let comments = Arc::new(SqliteCommentStore::new(pool));

    // 2. Object storage
    #[cfg(feature = "storage-local")]
    let media = Arc::new(LocalMediaStore::new(
        format!("{data_dir}/uploads").into(),
        "/static/uploads".to_string(),
    ));

    // 3. Local session
    #[cfg(feature = "session-local")]
    let sessions = Arc::new(FileSessionStore::new(
        format!("{data_dir}/session.json").into(),
    ));

    let mut controller = SuggestionController::new(suggestions, sessions);
    controller.restore_session();

    // A capsule path argument opens a shared view,
    // e.g. capsule-studio /capsule/alice/My%20Game
    if let Some(target) = std::env::args().nth(1).and_then(|arg| parse_capsule_path(&arg)) {
        match controller.load_shared(&target.username, &target.title).await {
            Ok(()) => log::info!("viewing {}'s \"{}\"", target.username, target.title),
            Err(err) => log::error!("{err}"),
        }
    }

    controller.load_default().await;
    if controller.identity().is_some() {
        if let Err(err) = controller.load_list().await {
            log::error!("{err}");
        }
    }

    let mut panel = CommentPanel::new(comments);
    panel.retarget(controller.current().id).await;

    let mut library = MediaLibrary::new(media);
    if controller.identity().is_some() {
        if let Err(err) = library.refresh().await {
            log::error!("{err}");
        }
    }

    match controller.identity() {
        Some(identity) => log::info!("signed in as {}", identity.username),
        None => log::info!("no saved session; sign in to edit"),
    }
    log::info!(
        "current capsule: \"{}\" ({} known, {} comments, {} media files)",
        controller.current().title,
        controller.known().len(),
        panel.comments().len(),
        library.files().len()
    );

    Ok(())
}
