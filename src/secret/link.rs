//! Secret links as URLs: `<base><path>?email=..&date=..&code=..`.

use serde::Deserialize;
use url::Url;

use super::{SecretSigner, SignedToken};

/// Completes a registration.
pub const REGISTER_PATH: &str = "/register";
/// Completes a password reset.
pub const PASSWORD_RESET_PATH: &str = "/passwordReset";

/// Build the link mailed to `identity`.
pub fn confirmation_url(
    base_url: &str,
    path: &str,
    identity: &str,
    token: &SignedToken,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?.join(path)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("email", identity)
        .append_pair("date", &token.issued_at)
        .append_pair("code", &token.signature);
    Ok(url)
}

/// Query parameters of a followed link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkQuery {
    pub email: String,
    pub date: String,
    pub code: String,
}

impl LinkQuery {
    /// Pull the three parameters out of a URL. `None` if any is missing.
    pub fn from_url(url: &Url) -> Option<Self> {
        let (mut email, mut date, mut code) = (None, None, None);
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "email" => email = Some(value.into_owned()),
                "date" => date = Some(value.into_owned()),
                "code" => code = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            email: email?,
            date: date?,
            code: code?,
        })
    }

    pub fn verify(&self, signer: &SecretSigner) -> bool {
        signer.verify(&self.code, &self.email, &self.date)
    }
}
