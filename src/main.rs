use cinevibe::{
    coordinator::FetchStatus,
    models::SectionKind,
    Config, Coordinator,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads the home view once and, given a term, runs a search against it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinevibe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let coordinator = Coordinator::from_config(&config)?;

    if let Some(message) = coordinator.state().fatal_error {
        tracing::error!("{}", message);
        anyhow::bail!(message);
    }

    coordinator.initialize().await;

    let state = coordinator.state();
    if state.home_status == FetchStatus::Success {
        for kind in SectionKind::ALL {
            tracing::info!(section = %kind, movies = state.home.section(kind).len(), "Home section");
        }
        if let Some(featured) = state.featured() {
            tracing::info!(movie_id = featured.id, title = %featured.title, "Featured");
        }
    }

    if let Some(term) = std::env::args().nth(1) {
        let filters = state.filters.clone();
        coordinator.run_discover(filters, &term).await;

        for movie in coordinator.state().results.iter().take(10) {
            tracing::info!(
                movie_id = movie.id,
                year = ?movie.release_year(),
                rating = ?movie.vote_average,
                "{}",
                movie.title
            );
        }
    }

    if let Some(message) = coordinator.state().error_message {
        tracing::warn!("{}", message);
    }

    coordinator.shutdown();
    Ok(())
}
