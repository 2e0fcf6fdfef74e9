use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ClientError;

/// Connection configuration for [`HttpTransport`](super::HttpTransport).
///
/// Authentication precedence:
/// 1. explicit `user` + `pass`
/// 2. cookie file (`username:password` first line) from `cookie_file`
/// 3. no auth
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// HTTP(S) URL of the node's RPC endpoint.
    pub url: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Path to bitcoind's `.cookie` file.
    pub cookie_file: Option<PathBuf>,
    /// Wallet to scope wallet RPCs to; appends `/wallet/<name>` to the
    /// endpoint path for multi-wallet nodes.
    pub wallet: Option<String>,
    /// Rate limit per outbound HTTP request (batches count as one).
    pub requests_per_second: Option<u32>,
    /// Maximum number of calls per batched wire request.
    pub batch_chunk_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8332".to_owned(),
            user: None,
            pass: None,
            cookie_file: None,
            wallet: None,
            requests_per_second: None,
            batch_chunk_size: 50,
        }
    }
}

pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<Option<(String, String)>, ClientError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok(Some((u.to_owned(), p.to_owned()))),
        (Some(_), None) | (None, Some(_)) => {
            return Err(ClientError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    let Some(cookie_file) = cookie_file else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(cookie_file).map_err(|e| {
        ClientError::Config(format!(
            "failed to read rpc cookie file {}: {e}",
            cookie_file.display()
        ))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| {
            ClientError::Config(format!(
                "rpc cookie file {} is empty",
                cookie_file.display()
            ))
        })?;

    let (cookie_user, cookie_pass) = line.split_once(':').ok_or_else(|| {
        ClientError::Config(format!(
            "rpc cookie file {} must contain `username:password`",
            cookie_file.display()
        ))
    })?;
    if cookie_user.is_empty() || cookie_pass.is_empty() {
        return Err(ClientError::Config(format!(
            "rpc cookie file {} must contain non-empty `username:password`",
            cookie_file.display()
        )));
    }

    Ok(Some((cookie_user.to_owned(), cookie_pass.to_owned())))
}

/// Validate the endpoint URL and apply the optional wallet path.
pub(super) fn endpoint_url(url: &str, wallet: Option<&str>) -> Result<String, ClientError> {
    let parsed = Url::parse(url).map_err(|e| {
        ClientError::Config(format!(
            "invalid rpc url `{url}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::Config(format!(
                "unsupported rpc url scheme `{other}`; expected http or https"
            )));
        }
    }

    match wallet {
        None => Ok(url.to_owned()),
        Some(wallet) => Ok(format!("{}/wallet/{wallet}", url.trim_end_matches('/'))),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn endpoint_url_plain_http() {
        let url = endpoint_url("http://127.0.0.1:8332", None).expect("should parse");
        assert_eq!(url, "http://127.0.0.1:8332");
    }

    #[test]
    fn endpoint_url_appends_wallet_path() {
        let url = endpoint_url("http://127.0.0.1:8332/", Some("hot")).expect("should parse");
        assert_eq!(url, "http://127.0.0.1:8332/wallet/hot");
    }

    #[test]
    fn endpoint_url_rejects_non_http_scheme() {
        let err = endpoint_url("ftp://example.com", None).expect_err("must reject ftp");
        assert!(err.to_string().contains("unsupported rpc url scheme"));
    }

    #[test]
    fn resolve_auth_rejects_partial_credentials() {
        let err = resolve_auth(Some("user"), None, None).expect_err("must reject partial auth");
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn resolve_auth_accepts_user_and_pass() {
        let auth = resolve_auth(Some("alice"), Some("secret"), None).expect("auth must parse");
        assert_eq!(auth, Some(("alice".to_owned(), "secret".to_owned())));
    }

    #[test]
    fn resolve_auth_reads_cookie_file() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time must be after unix epoch")
            .as_nanos();
        let cookie_path = std::env::temp_dir().join(format!("nodectl-cookie-{unique}.txt"));
        fs::write(&cookie_path, "__cookie__:token\n").expect("cookie file must be writable");

        let auth = resolve_auth(None, None, Some(&cookie_path)).expect("cookie must parse");
        assert_eq!(auth, Some(("__cookie__".to_owned(), "token".to_owned())));

        let _ = fs::remove_file(cookie_path);
    }

    #[test]
    fn resolve_auth_rejects_malformed_cookie() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time must be after unix epoch")
            .as_nanos();
        let cookie_path = std::env::temp_dir().join(format!("nodectl-badcookie-{unique}.txt"));
        fs::write(&cookie_path, "no-separator\n").expect("cookie file must be writable");

        let err = resolve_auth(None, None, Some(&cookie_path)).expect_err("must reject");
        assert!(err.to_string().contains("username:password"));

        let _ = fs::remove_file(cookie_path);
    }
}
