use std::future::Future;

use tokio::net::TcpListener;

use crate::{router::router, state::State};

pub async fn serve<F>(state: State, listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(
        state.service,
        state.enable_cors,
        state.max_body_size,
        state.metrics,
    );

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {:?}", addr),
        Err(e) => tracing::warn!("could not read local address: {}", e),
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!("Server error: {}", e);
    }
}
