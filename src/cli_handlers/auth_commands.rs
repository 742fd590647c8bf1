use dialoguer::Password;
use serde_json::json;

use crate::cli::AuthCommands;
use crate::error::Result;
use crate::session::SessionManager;

/// Handle all `st auth` subcommands
pub async fn handle_auth_command(sessions: &SessionManager, cmd: AuthCommands) -> Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => Password::new().with_prompt("Password").interact()?,
            };

            let session = sessions.sign_in(email.trim(), &password).await?;
            println!("✅ Signed in as {}", session.user.email);
            Ok(())
        },

        AuthCommands::Logout => {
            let was_signed_in = sessions.current().is_some();
            sessions.sign_out().await?;
            if was_signed_in {
                println!("👋 Signed out.");
            } else {
                println!("Not signed in.");
            }
            Ok(())
        },

        AuthCommands::Status { format } => {
            match sessions.current() {
                Some(session) => {
                    // Validate the stored token against the provider so
                    // "signed in" means the session actually works.
                    match sessions.auth().fetch_user(&session.access_token).await {
                        Ok(user) => {
                            if format == "json" {
                                println!(
                                    "{}",
                                    serde_json::to_string_pretty(&json!({
                                        "signed_in": true,
                                        "user": user,
                                    }))?
                                );
                            } else {
                                println!("✅ Signed in as {} (id {})", user.email, user.id);
                            }
                        },
                        Err(e) => {
                            tracing::warn!("Stored session failed validation: {}", e);
                            if format == "json" {
                                println!(
                                    "{}",
                                    serde_json::to_string_pretty(&json!({
                                        "signed_in": false,
                                        "stale_session": true,
                                    }))?
                                );
                            } else {
                                println!(
                                    "⚠️  Stored session for {} is no longer valid. Run 'st auth login' again.",
                                    session.user.email
                                );
                            }
                        },
                    }
                },
                None => {
                    if format == "json" {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({ "signed_in": false }))?
                        );
                    } else {
                        println!("Not signed in. Run 'st auth login --email <email>' first.");
                    }
                },
            }
            Ok(())
        },
    }
}
