use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_session, save_session};
use crate::cli::utils::{output_record, output_success};
use crate::cli::OutputFormat;
use crate::services::SignupRequest;
use crate::types::Role;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session token")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Server URL to sign in against (remembered for later commands)")]
        server: Option<String>,
    },

    #[command(about = "Create an account and sign in as it")]
    Signup {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, default_value = "client", help = "Role: client, musician or admin")]
        role: Role,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Display name")]
        display_name: Option<String>,
        #[arg(long, help = "Public name shown in the musician catalogue")]
        name: Option<String>,
        #[arg(long, help = "Location shown in the musician catalogue")]
        location: Option<String>,
        #[arg(long, help = "Server URL (remembered for later commands)")]
        server: Option<String>,
    },

    #[command(about = "Show the signed-in user")]
    Whoami,

    #[command(about = "Revoke every session of the signed-in user")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        AuthCommands::Login { email, password, server } => {
            if let Some(server) = server {
                session.server = server;
            }
            let password = resolve_password(password)?;
            let mut client = session.client()?;
            let signed_in = client.login(&email, &password).await?;

            session.sign_in(signed_in.id_token.clone(), signed_in.email.clone(), signed_in.role);
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Signed in as {} ({})", signed_in.display_name, signed_in.email),
                Some(json!({ "email": signed_in.email, "role": signed_in.role, "expiresIn": signed_in.expires_in })),
            )
        }
        AuthCommands::Signup {
            email,
            role,
            password,
            display_name,
            name,
            location,
            server,
        } => {
            if let Some(server) = server {
                session.server = server;
            }
            let request = SignupRequest {
                email,
                password: resolve_password(password)?,
                display_name,
                name,
                location,
                photo_url: None,
            };
            let mut client = session.client()?;
            let created = client.signup(role, &request).await?;

            session.sign_in(created.id_token.clone(), created.email.clone(), Some(created.role));
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Created {} account {}", created.role, created.email),
                Some(json!({ "uid": created.uid, "email": created.email, "role": created.role })),
            )
        }
        AuthCommands::Whoami => {
            let client = session.authenticated_client()?;
            let user = client.whoami().await?;
            output_record(&output_format, &user)
        }
        AuthCommands::Logout => {
            if let Ok(mut client) = session.authenticated_client() {
                // A token the server already rejects still gets dropped locally
                if let Err(e) = client.signout().await {
                    tracing::warn!("Server sign-out failed: {}", e);
                }
            }
            session.sign_out();
            save_session(&session)?;
            output_success(&output_format, "Signed out", None)
        }
    }
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow::anyhow!("Password required (use --password or pipe it on stdin)"));
    }
    Ok(password)
}
