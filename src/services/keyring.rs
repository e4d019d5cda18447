use std::collections::HashMap;

use super::Session;

pub(crate) const SERVICE_NAME: &str = "mortar";
const SESSION_SERVER: &str = "mortar-session";

/// Persist the signed-in session in the system keyring via Secret Service,
/// so a restart resumes without re-prompting for the password.
pub async fn store_session(session: &Session) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", SESSION_SERVER);

    let secret = serde_json::to_string(session)
        .map_err(|e| format!("Failed to encode session: {}", e))?;

    keyring
        .create_item("Mortar session", &attrs, secret.as_bytes(), true)
        .await
        .map_err(|e| format!("Failed to store session: {}", e))?;

    Ok(())
}

/// Load the persisted session, if any.
pub async fn load_session() -> Result<Option<Session>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", SESSION_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        if let Ok(session) = serde_json::from_slice::<Session>(&secret_bytes.to_vec()) {
            return Ok(Some(session));
        }
    }

    Ok(None)
}

/// Drop the persisted session on sign-out.
pub async fn clear_session() -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", SESSION_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete session: {}", e))?;
    }

    Ok(())
}
