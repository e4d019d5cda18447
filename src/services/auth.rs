use serde::Deserialize;

use super::Session;

/// Wire shape of the provider's sign-in response.
#[derive(Debug, Clone, Deserialize)]
struct SignInResponse {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "organizationId", default)]
    organization_id: String,
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: String,
}

fn sessions_url(base_url: &str) -> String {
    format!("{}/v1/sessions", base_url.trim_end_matches('/'))
}

/// Sign in with email and password. Provider error codes are mapped to the
/// fixed strings shown on the login form.
pub async fn sign_in(base_url: &str, email: &str, password: &str) -> Result<Session, String> {
    let body = serde_json::json!({ "email": email, "password": password });

    let client = reqwest::Client::new();
    let resp = client
        .post(sessions_url(base_url))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("Sign-in request failed: {}", e))?;

    if !resp.status().is_success() {
        let code = resp
            .json::<ProviderError>()
            .await
            .map(|e| e.code)
            .unwrap_or_default();
        return Err(auth_error_message(&code).to_string());
    }

    let signed_in: SignInResponse = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse sign-in response: {}", e))?;

    Ok(Session {
        user_id: signed_in.user_id,
        organization_id: signed_in.organization_id,
        token: signed_in.token,
    })
}

/// End the session server-side. Local state is cleared regardless of the
/// outcome, so callers only log a failure here.
pub async fn sign_out(base_url: &str, token: &str) -> Result<(), String> {
    let client = reqwest::Client::new();
    let resp = client
        .delete(format!("{}/current", sessions_url(base_url)))
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| format!("Sign-out request failed: {}", e))?;

    if !resp.status().is_success() {
        return Err(format!("Sign-out failed: {}", resp.status()));
    }
    Ok(())
}

/// Change the signed-in user's password. The provider re-checks the current
/// password, so its error codes come back through the same mapping.
pub async fn change_password(
    base_url: &str,
    token: &str,
    current: &str,
    new: &str,
) -> Result<(), String> {
    let body = serde_json::json!({ "currentPassword": current, "newPassword": new });

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/password", base_url.trim_end_matches('/')))
        .bearer_auth(token)
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("Password change request failed: {}", e))?;

    if !resp.status().is_success() {
        let code = resp
            .json::<ProviderError>()
            .await
            .map(|e| e.code)
            .unwrap_or_default();
        return Err(auth_error_message(&code).to_string());
    }
    Ok(())
}

/// Ask the provider to email a reset link.
pub async fn reset_password(base_url: &str, email: &str) -> Result<(), String> {
    let body = serde_json::json!({ "email": email });

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/password/reset", base_url.trim_end_matches('/')))
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("Password reset request failed: {}", e))?;

    if !resp.status().is_success() {
        let code = resp
            .json::<ProviderError>()
            .await
            .map(|e| e.code)
            .unwrap_or_default();
        return Err(auth_error_message(&code).to_string());
    }
    Ok(())
}

/// Fixed user-facing strings per provider error code.
pub fn auth_error_message(code: &str) -> &'static str {
    match code {
        "auth/user-not-found" | "auth/wrong-password" => "Invalid email or password",
        "auth/email-already-in-use" => "This email is already registered",
        "auth/weak-password" => "Password should be at least 6 characters",
        "auth/invalid-email" => "Invalid email address",
        "auth/user-disabled" => "This account has been disabled",
        "auth/too-many-requests" => "Too many attempts. Please try again later",
        "auth/network-request-failed" => "Network error. Please check your connection",
        "auth/requires-recent-login" => "Please sign in again to perform this action",
        _ => "An error occurred. Please try again",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_fixed_strings() {
        assert_eq!(
            auth_error_message("auth/wrong-password"),
            "Invalid email or password"
        );
        assert_eq!(
            auth_error_message("auth/user-not-found"),
            "Invalid email or password"
        );
        assert_eq!(
            auth_error_message("auth/user-disabled"),
            "This account has been disabled"
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_generic_string() {
        assert_eq!(
            auth_error_message("auth/some-new-code"),
            "An error occurred. Please try again"
        );
        assert_eq!(auth_error_message(""), "An error occurred. Please try again");
    }
}
