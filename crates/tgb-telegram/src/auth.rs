//! Session startup: connect, and sign in interactively on first use.

use std::path::Path;

use grammers_client::{Client, Config as ClientConfig, SignInError};
use grammers_session::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tracing::info;

use tgb_core::{config::Config, errors::Error, Result};

/// Connect with the stored session, signing in first if it is not authorized.
///
/// Prompts go to stderr and answers are read from stdin, so stdout stays clean.
pub async fn connect(cfg: &Config) -> Result<Client> {
    let session = Session::load_file_or_create(&cfg.session_file).map_err(|e| {
        Error::Auth(format!(
            "cannot open session file {}: {e}",
            cfg.session_file.display()
        ))
    })?;

    let client = Client::connect(ClientConfig {
        session,
        api_id: cfg.api_id,
        api_hash: cfg.api_hash.clone(),
        params: Default::default(),
    })
    .await
    .map_err(|e| Error::Transport(format!("cannot connect to Telegram: {e}")))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| Error::Transport(format!("authorization check failed: {e}")))?;
    if !authorized {
        sign_in(&client, cfg).await?;
        save_session(&client, &cfg.session_file)?;
    }

    Ok(client)
}

pub fn save_session(client: &Client, path: &Path) -> Result<()> {
    client
        .session()
        .save_to_file(path)
        .map_err(|e| Error::Auth(format!("cannot save session to {}: {e}", path.display())))
}

async fn sign_in(client: &Client, cfg: &Config) -> Result<()> {
    // Shared by every prompt so answers piped in together are not lost.
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let phone = match &cfg.phone {
        Some(p) => p.clone(),
        None => prompt(&mut stdin, "Phone number (international format): ").await?,
    };

    let token = client
        .request_login_code(phone.trim())
        .await
        .map_err(|e| Error::Auth(format!("login code request failed: {e}")))?;
    let code = prompt(&mut stdin, "Login code: ").await?;

    match client.sign_in(&token, code.trim()).await {
        Ok(_) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let password = match &cfg.password {
                Some(p) => p.clone(),
                None => prompt(&mut stdin, "2FA password: ").await?,
            };
            client
                .check_password(password_token, password.trim())
                .await
                .map_err(|e| Error::Auth(format!("2FA check failed: {e}")))?;
        }
        Err(e) => return Err(Error::Auth(format!("sign in failed: {e}"))),
    }

    info!("signed in to Telegram");
    Ok(())
}

async fn prompt<R>(lines: &mut Lines<R>, question: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut stderr = tokio::io::stderr();
    stderr.write_all(question.as_bytes()).await?;
    stderr.flush().await?;

    let Some(line) = lines.next_line().await? else {
        return Err(Error::Auth(format!(
            "stdin closed while waiting for: {}",
            question.trim_end_matches([' ', ':'])
        )));
    };
    Ok(line)
}
