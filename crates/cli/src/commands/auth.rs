//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! shop register -u alice -p 's3cret'
//! shop login -u alice -p 's3cret'
//! shop logout
//! ```

use std::io::Write;

use shopfront_core::Username;
use shopfront_storefront::api::Credentials;

use super::Context;
use crate::error::CliError;

/// Exchange credentials for a token and store it.
///
/// # Errors
///
/// Returns an error if the username is invalid, the backend rejects the
/// credentials, or the token file can't be written.
pub async fn login(
    ctx: &Context,
    out: &mut impl Write,
    username: &str,
    password: String,
) -> Result<(), CliError> {
    let username = Username::parse(username)?;
    let credentials = Credentials::new(username, password);

    let token = ctx.api.login(&credentials).await.map_err(|e| {
        tracing::debug!("Login failed: {e}");
        CliError::Nothing("Invalid username or password".to_string())
    })?;

    let access_token = secrecy::SecretString::from(token.access_token);
    ctx.tokens.save(credentials.username.as_str(), &access_token)?;

    writeln!(out, "Signed in as {}", credentials.username)?;
    Ok(())
}

/// Forget the stored token.
///
/// # Errors
///
/// Returns an error if the token file exists but can't be removed.
pub fn logout(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    if ctx.tokens.clear()? {
        writeln!(out, "Signed out")?;
    } else {
        writeln!(out, "Not signed in")?;
    }
    Ok(())
}

/// Create an account.
///
/// # Errors
///
/// Returns an error if the username is invalid or the backend refuses the
/// registration.
pub async fn register(
    ctx: &Context,
    out: &mut impl Write,
    username: &str,
    password: String,
) -> Result<(), CliError> {
    let username = Username::parse(username)?;
    let credentials = Credentials::new(username, password);

    ctx.api
        .register(&credentials)
        .await
        .map_err(|e| CliError::Nothing(format!("Registration failed: {}", e.detail())))?;

    writeln!(
        out,
        "Registration successful! Now sign in with `shop login -u {}`.",
        credentials.username
    )?;
    Ok(())
}
