//! Connection session state management

/// Encapsulated session state for a client connection. The logged-in
/// identity lives here and is passed through the request path explicitly;
/// there is no ambient per-visitor state anywhere else.
pub struct Session {
    pending_username: Option<String>,
    authenticated: bool,
    username: Option<String>,
    operator: bool,
    is_tls: bool,
    allow_auth_insecure: bool,
}

impl Session {
    pub fn new(is_tls: bool, allow_auth_insecure: bool) -> Self {
        Self {
            pending_username: None,
            authenticated: false,
            username: None,
            operator: false,
            is_tls,
            allow_auth_insecure,
        }
    }

    /// Set the pending username for the USER/PASS flow.
    /// Called when USER is received but before PASS is verified.
    pub fn set_pending_username(&mut self, username: String) {
        self.pending_username = Some(username);
    }

    /// Get the pending username set by USER.
    pub fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    /// Mark the session as authenticated under the pending username.
    pub fn confirm_authentication(&mut self, operator: bool) {
        self.username = self.pending_username.take();
        self.authenticated = true;
        self.operator = operator;
    }

    /// Drop the logged-in identity, returning to the pre-login state.
    pub fn logout(&mut self) {
        self.pending_username = None;
        self.username = None;
        self.authenticated = false;
        self.operator = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_operator(&self) -> bool {
        self.authenticated && self.operator
    }

    /// Check if authentication is allowed on this connection.
    /// Returns true if TLS or if insecure auth is explicitly allowed.
    pub fn can_authenticate(&self) -> bool {
        self.is_tls || self.allow_auth_insecure
    }

    pub fn is_tls(&self) -> bool {
        self.is_tls
    }
}
