use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

const SESSION_ID_LENGTH: usize = 25;
const GENERATED_PASSWORD_LENGTH: usize = 15;
const SLUG_LENGTH: usize = 25;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+@.+\..+$").unwrap());
static SLUG_REMOVE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]"#).unwrap());
static SLUG_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn new_session_id() -> String {
    random_alphanumeric(SESSION_ID_LENGTH)
}

pub fn gen_password() -> String {
    random_alphanumeric(GENERATED_PASSWORD_LENGTH)
}

/// URL slug for a page title: `"Bob's Café & Bar!"` becomes `"bobs-caf-bar"`.
pub fn gen_slug(title: &str) -> String {
    let slug = SLUG_REMOVE.replace_all(title, "");
    let slug = SLUG_SEPARATOR.replace_all(&slug, "-");
    let mut slug = slug.trim_matches('-').to_ascii_lowercase();
    if slug.len() > SLUG_LENGTH {
        // only ASCII survives the separator pass, so byte truncation is safe
        slug.truncate(SLUG_LENGTH);
        slug.truncate(slug.trim_end_matches('-').len());
    }
    slug
}

pub fn valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
