use crate::cli::LoginArgs;
use crate::client::ApiClient;
use crate::commands::prompt;
use crate::error::{CatalogError, Result};
use crate::output;

pub async fn login(client: &ApiClient, args: LoginArgs) -> Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let username = username.trim();
    if username.is_empty() {
        return Err(CatalogError::MissingField("username"));
    }

    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CatalogError::MissingField("password"));
    }

    client.login(username, &password).await?;
    output::print_message(&format!(
        "Logged in as {username}. Re-run the interrupted command to pick up where you left off."
    ));

    Ok(())
}

pub fn logout(client: &ApiClient) -> Result<()> {
    client.logout()?;
    output::print_message("Logged out");

    Ok(())
}
