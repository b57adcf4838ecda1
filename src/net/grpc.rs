//! Side gRPC server.
//!
//! # Responsibilities
//! - Bind the listener up front so address errors surface synchronously
//! - Serve the registered routes in a background task

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::Routes;
use tonic::transport::Server;
use tracing::Instrument;

/// Bind `address` and serve `routes` on it.
///
/// Returns the bound address (useful with port 0) and the serving task.
pub async fn serve_routes(
    routes: Routes,
    address: SocketAddr,
) -> Result<(SocketAddr, JoinHandle<()>), std::io::Error> {
    let listener = TcpListener::bind(address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "gRPC server listening");

    let handle = tokio::spawn(
        async move {
            let incoming = TcpListenerStream::new(listener);
            if let Err(e) = Server::builder()
                .add_routes(routes)
                .serve_with_incoming(incoming)
                .await
            {
                tracing::error!(error = %e, "gRPC server stopped with error");
            }
        }
        .in_current_span(),
    );

    Ok((local_addr, handle))
}
