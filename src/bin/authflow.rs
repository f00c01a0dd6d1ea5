use anyhow::Result;
use authflow::cli::{actions, actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    match action {
        Action::Server(args) => actions::server::handle(args).await?,
    }

    Ok(())
}
