//! Credential storage using the OS credential store.
//!
//! The console keeps exactly two process-wide secrets: the backend base URL
//! and the bearer session token handed back by the identity exchange. On
//! Windows this uses DPAPI (via the `keyring` crate), on macOS Keychain,
//! and on Linux the Secret Service API.
//!
//! Token lifecycle is owned by the login flow, not this crate: the API
//! client only reads the token per request and treats expiry as a fatal
//! error surfaced to the user.

use keyring::Entry;
use tracing::warn;

const SERVICE_NAME: &str = "shop-admin-console";

// Credential keys
const KEY_BACKEND_URL: &str = "backend_url";
const KEY_SESSION_TOKEN: &str = "session_token";

// ---------------------------------------------------------------------------
// Low-level helpers
// ---------------------------------------------------------------------------

/// Retrieve a single credential from the OS keyring. Returns `None` when the
/// entry does not exist (or the platform returns a "not found" error).
fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

fn set_credential(key: &str, value: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    entry.set_password(value).map_err(|e| e.to_string())?;
    Ok(())
}

/// Delete a credential. Silently succeeds if the entry does not exist.
fn delete_credential(key: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// High-level API
// ---------------------------------------------------------------------------

// The setters are the login shell's side of the seam: it stores the URL
// from the sign-in form and the token from the identity exchange; this
// crate only reads them back per request.

pub fn get_backend_url() -> Option<String> {
    get_credential(KEY_BACKEND_URL)
}

pub fn set_backend_url(url: &str) -> Result<(), String> {
    set_credential(KEY_BACKEND_URL, url)
}

pub fn get_session_token() -> Option<String> {
    get_credential(KEY_SESSION_TOKEN)
}

pub fn set_session_token(token: &str) -> Result<(), String> {
    set_credential(KEY_SESSION_TOKEN, token)
}

/// Drop the stored session on logout. Called by the login shell (the
/// identity-exchange flow lives outside this crate); the backend URL
/// survives so the next login does not have to re-enter it.
pub fn clear_session() -> Result<(), String> {
    delete_credential(KEY_SESSION_TOKEN)
}

/// The console is usable once both the backend URL and a session token are
/// present in the credential store. The login shell checks this at startup
/// to decide between the sign-in screen and the console proper.
pub fn is_configured() -> bool {
    get_backend_url().is_some() && get_session_token().is_some()
}
