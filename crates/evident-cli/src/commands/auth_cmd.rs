use evident_core::auth::{AuthClient, AuthSession};

use crate::cli::AuthCommands;
use crate::commands::common::{describe_outcome, Context};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, context: &Context) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let client = AuthClient::from_config(&context.config)?;
            let session = client.login(&email, &password).await?;
            adopt_session(session, context).await
        }
        AuthCommands::Register { email, password } => {
            let client = AuthClient::from_config(&context.config)?;
            let session = client.register(&email, &password).await?;
            adopt_session(session, context).await
        }
        AuthCommands::Status => {
            let coordinator = context.open_coordinator().await?;
            let pending = coordinator.store().list_unsynced().await?.len();
            match coordinator.session().user().await {
                Some(user) => println!(
                    "Profile '{}' is signed in as {} ({} pending)",
                    context.profile_name, user.email, pending
                ),
                None => println!(
                    "Profile '{}' is not signed in ({} pending)",
                    context.profile_name, pending
                ),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let coordinator = context.open_coordinator().await?;
            coordinator.sign_out().await?;
            let pending = coordinator.store().list_unsynced().await?.len();
            println!("Signed out profile '{}'", context.profile_name);
            if pending > 0 {
                println!("{pending} queued logs stay on this device until you sign in again.");
            }
            Ok(())
        }
    }
}

async fn adopt_session(session: AuthSession, context: &Context) -> Result<(), CliError> {
    let coordinator = context.open_coordinator().await?;
    let email = session.user.email.clone();
    let outcome = coordinator.sign_in(session).await?;
    println!("Signed in profile '{}' as {email}", context.profile_name);
    println!("{}", describe_outcome(&outcome));
    Ok(())
}
