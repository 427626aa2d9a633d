//! Login and logout handlers

use anyhow::{Context, Result};
use dialoguer::{Input, Password};

use triagem_core::{AuthClient, Config};

use crate::output::Output;

/// Sign in, prompting for whatever wasn't given on the command line
pub async fn login(config: &Config, email: Option<String>, output: &Output) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    let auth = AuthClient::new(config);
    let session = auth
        .sign_in(&email, &password)
        .await
        .context("Sign-in failed")?;

    output.success(&format!("Signed in as {}", session.email));
    Ok(())
}

/// Sign out and discard the stored session
pub async fn logout(config: &Config, output: &Output) -> Result<()> {
    let auth = AuthClient::new(config);
    if auth.session().is_none() {
        output.message("Not signed in.");
        return Ok(());
    }

    auth.sign_out().await.context("Sign-out failed")?;
    output.success("Signed out");
    Ok(())
}
