//! Account and session commands.

use freshbasket_client::auth::AuthService;
use freshbasket_core::Role;
use thiserror::Error;

use super::Context;

/// Errors specific to auth commands.
#[derive(Debug, Error)]
pub enum AuthCommandError {
    /// Invalid role argument.
    #[error("Invalid role: {0}. Valid roles: customer, vendor, admin")]
    InvalidRole(String),
}

/// Parse a role argument; unknown values are rejected rather than silently
/// mapped to customer.
fn parse_role(role: &str) -> Result<Role, AuthCommandError> {
    match role {
        "customer" => Ok(Role::Customer),
        "vendor" => Ok(Role::Vendor),
        "admin" => Ok(Role::Admin),
        other => Err(AuthCommandError::InvalidRole(other.to_string())),
    }
}

/// Create an account.
pub async fn signup(
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = parse_role(role)?;
    let ctx = Context::from_env()?;

    AuthService::new(ctx.api)
        .signup(username, email, password, role)
        .await?;

    tracing::info!("Account created for {email}. Log in via OTP:");
    tracing::info!("  fb-cli auth otp -e {email}");
    Ok(())
}

/// Request a one-time password.
pub async fn request_otp(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let otp = AuthService::new(ctx.api).request_otp(email).await?;

    tracing::info!("OTP sent to {email}");
    if let Some(otp) = otp {
        // Dev-mode deployments echo the OTP back
        tracing::info!("  Dev OTP: {otp}");
    }
    Ok(())
}

/// Verify an OTP and persist the session.
pub async fn login(email: &str, otp: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let outcome = AuthService::new(ctx.api).login(email, otp).await?;

    tracing::info!("Logged in as {email} ({:?})", outcome.role);
    tracing::info!("  Landing route: {}", outcome.landing_route);
    Ok(())
}

/// Clear the persisted session.
pub fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    AuthService::new(ctx.api).logout()?;

    tracing::info!("Logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("customer").expect("role"), Role::Customer);
        assert_eq!(parse_role("vendor").expect("role"), Role::Vendor);
        assert_eq!(parse_role("admin").expect("role"), Role::Admin);
        assert!(parse_role("warehouse").is_err());
    }
}
