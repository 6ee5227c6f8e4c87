use std::sync::Arc;

use tracing::{info, warn};

use crate::models::SignUpOutcome;
use crate::store::AuthProvider;

use super::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Render model of the sign-in / sign-up page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthScreen {
    pub title: &'static str,
    pub submit_label: &'static str,
    pub toggle_label: &'static str,
    pub message: Option<String>,
    pub message_is_error: bool,
    pub inputs_disabled: bool,
}

/// Email/password form. Outcomes are reported inline through `message`.
pub struct AuthForm {
    provider: Arc<dyn AuthProvider>,
    redirect_to: Option<String>,
    pub email: String,
    pub password: String,
    mode: AuthMode,
    loading: bool,
    message: Option<String>,
    redirect: Option<Route>,
}

impl AuthForm {
    /// `redirect_to` is where the confirmation email sends the user back to.
    pub fn new(provider: Arc<dyn AuthProvider>, redirect_to: Option<String>) -> Self {
        Self {
            provider,
            redirect_to,
            email: String::new(),
            password: String::new(),
            mode: AuthMode::SignIn,
            loading: false,
            message: None,
            redirect: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        if self.loading {
            return;
        }
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn message_is_error(&self) -> bool {
        self.message
            .as_deref()
            .is_some_and(|m| m.contains("error") || m.contains("Error"))
    }

    /// Navigation requested by a successful sign-in, taken once.
    pub fn take_redirect(&mut self) -> Option<Route> {
        self.redirect.take()
    }

    /// Runs sign-in or sign-up depending on the current mode.
    pub async fn submit(&mut self) {
        match self.mode {
            AuthMode::SignIn => self.sign_in().await,
            AuthMode::SignUp => self.sign_up().await,
        }
    }

    pub async fn sign_up(&mut self) {
        self.loading = true;
        self.message = None;

        let result = self
            .provider
            .sign_up(&self.email, &self.password, self.redirect_to.as_deref())
            .await;

        self.message = Some(match result {
            Ok(SignUpOutcome::ConfirmationSent(_)) => "Check your email to confirm sign up!".to_string(),
            Ok(SignUpOutcome::SignedIn(_)) => {
                self.redirect = Some(Route::Dashboard);
                "Sign up successful! Redirecting...".to_string()
            }
            Err(err) => {
                warn!("sign up failed: {}", err);
                format!("Sign up error: {}", err)
            }
        });
        self.loading = false;
    }

    pub async fn sign_in(&mut self) {
        self.loading = true;
        self.message = None;

        match self.provider.sign_in(&self.email, &self.password).await {
            Ok(session) => {
                info!("login successful for {}", session.user.id);
                self.message = Some("Login successful! Redirecting...".to_string());
                self.redirect = Some(Route::Dashboard);
            }
            Err(err) => {
                warn!("login failed: {}", err);
                self.message = Some(format!("Login error: {}", err));
            }
        }
        self.loading = false;
    }

    pub async fn sign_out(&mut self) {
        self.loading = true;
        let message = match self.provider.sign_out().await {
            Ok(()) => "Logged out successfully".to_string(),
            Err(err) => {
                warn!("sign out failed: {}", err);
                format!("Sign out error: {}", err)
            }
        };
        self.message = Some(message);
        self.loading = false;
    }

    pub fn render(&self) -> AuthScreen {
        let (title, submit_label, toggle_label) = match (self.mode, self.loading) {
            (AuthMode::SignUp, true) => ("Sign Up", "Signing up...", "Already have an account? Log in"),
            (AuthMode::SignUp, false) => ("Sign Up", "Sign Up", "Already have an account? Log in"),
            (AuthMode::SignIn, true) => ("Log In", "Logging in...", "Don't have an account? Sign up"),
            (AuthMode::SignIn, false) => ("Log In", "Log In", "Don't have an account? Sign up"),
        };

        AuthScreen {
            title,
            submit_label,
            toggle_label,
            message: self.message.clone(),
            message_is_error: self.message_is_error(),
            inputs_disabled: self.loading,
        }
    }
}
