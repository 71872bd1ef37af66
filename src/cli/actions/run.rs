use crate::cli::actions::{server, Action};
use anyhow::Result;

pub(crate) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::handle(args).await,
    }
}
