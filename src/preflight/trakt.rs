//! Trakt API preflight check.

use super::CheckResult;
use crate::core::refresh::TraktApi;
use crate::models::config::Configuration;
use crate::Error;

/// Check that Trakt credentials are configured and accepted.
pub async fn check(config: &Configuration) -> CheckResult {
    let api = match TraktApi::from_config(config) {
        Ok(api) => api,
        Err(Error::TraktClientIdMissing) => {
            return CheckResult::fail(
                "Trakt API",
                "client ID not configured",
                "Set trakt.client_id or the TRAKT_CLIENT_ID environment variable",
            )
        }
        Err(e) => {
            return CheckResult::fail(
                "Trakt API",
                &e.to_string(),
                "Set trakt.access_token, trakt.token_file or TRAKT_ACCESS_TOKEN",
            )
        }
    };

    match api.trakt().verify_credentials().await {
        Ok(settings) => {
            let username = settings
                .get("user")
                .and_then(|u| u.get("username"))
                .and_then(|u| u.as_str())
                .unwrap_or("unknown user");
            CheckResult::ok("Trakt API", &format!("connected as {}", username))
        }
        Err(Error::TraktTokenUnavailable(reason)) => CheckResult::fail(
            "Trakt API",
            &format!("access token unavailable: {}", reason),
            "Check the configured token file",
        ),
        Err(_) => CheckResult::fail(
            "Trakt API",
            "credentials rejected or service unreachable",
            "Check your client ID, access token and network connection",
        ),
    }
}
