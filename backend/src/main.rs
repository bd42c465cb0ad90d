//! Server entry-point: configuration, storage wiring, and HTTP startup.

mod server;

use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::{AccountService, RecipeService};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    FsImageStore, YamlCredentialStore, YamlRecipeStore, open_data_dir,
};

use crate::server::config::AppConfig;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();

    let root = Arc::new(open_data_dir(config.data_dir())?);
    let credentials = YamlCredentialStore::new(Arc::clone(&root));
    credentials.initialize().map_err(io::Error::other)?;
    let accounts = Arc::new(AccountService::new(Arc::new(credentials)));
    let recipes = Arc::new(RecipeService::new(
        Arc::new(YamlRecipeStore::new(Arc::clone(&root))),
        Arc::new(FsImageStore::new(root)),
    ));

    let server = server::create_server(&config, HttpState::new(accounts, recipes))?;
    info!(
        bind = %config.bind(),
        data_dir = %config.data_dir().display(),
        "recipe box listening"
    );
    server.await
}
