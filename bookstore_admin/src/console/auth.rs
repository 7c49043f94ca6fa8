use reqwest::StatusCode;

use crate::api::{AuthResponse, SignIn};
use crate::console::AdminConsole;
use crate::errors::ApiError;
use crate::session::{CurrentUser, Route};

pub struct Auth<'a> {
    console: &'a AdminConsole,
}

impl<'a> Auth<'a> {
    pub(super) fn new(console: &'a AdminConsole) -> Self {
        Self { console }
    }

    /// A rejected login is reported, it never counts as an expired session
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let sign_in = SignIn {
            email: email.to_string(),
            password: password.to_string(),
        };

        let auth = match self.console.client.login(&sign_in).await {
            Ok(auth) => auth,
            Err(err) => {
                let message = match err.status() {
                    Some(StatusCode::UNAUTHORIZED) => "Invalid email or password",
                    Some(StatusCode::FORBIDDEN) => {
                        "Access Denied: You do not have administrator privileges."
                    }
                    _ => "Something went wrong. Please try again.",
                };
                tracing::warn!("Login failed {}", err);
                self.console.notifier.error(message);
                return Err(err);
            }
        };

        if let Err(err) = self.console.session.start(&auth) {
            self.console
                .notifier
                .error("Something went wrong. Please try again.");
            return Err(err.into());
        }
        tracing::info!(user_id = auth.user_id, role = %auth.role, "Logged in");
        self.console.notifier.success("Login successful");
        self.console.session.navigate(Route::Books);
        Ok(auth)
    }

    /// Drops the token, the stored user and everything cached
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Err(err) = self.console.session.end() {
            self.console.notifier.error("Failed to log out");
            return Err(err.into());
        }
        self.console.cache.clear();
        self.console.notifier.success("Logged out successfully");
        self.console.session.navigate(Route::Login);
        Ok(())
    }

    pub fn current_user(&self) -> CurrentUser {
        self.console.session.current_user()
    }
}
