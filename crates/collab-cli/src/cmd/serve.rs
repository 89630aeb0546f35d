use anyhow::Result;
use collab_core::config::Config;
use collab_core::registry::RegistryStore;
use std::sync::Arc;

pub fn run(port: u16, no_open: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();

        // Record the port so later commands find the server.
        let mut config = Config::load();
        config.port = Some(actual_port);
        if let Err(e) = config.save() {
            tracing::warn!("could not record server port: {e}");
        }

        let snapshot = collab_core::paths::queue_snapshot_path()?;
        let registry = Arc::new(RegistryStore::with_snapshot(snapshot));

        println!("plan-collab server → http://localhost:{actual_port}");

        tokio::select! {
            res = collab_server::serve_on(registry, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
