//! Navigation boundary.
//!
//! The engine never renders anything; it only needs to know where the caller
//! currently is and to be able to send them to the public entry view when a
//! session ends on a protected view.

use serde::{Deserialize, Serialize};

/// The views the application shell can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    SignIn,
    SignUp,
    Diagnostics,
    Dashboard,
    Appointments,
    Clients,
    Services,
    Performance,
    Waitlist,
    Calendar,
    Settings,
}

impl View {
    /// Public views are reachable without a session and exempt from the
    /// signed-out redirect.
    pub fn is_public(&self) -> bool {
        matches!(self, View::SignIn | View::SignUp | View::Diagnostics)
    }
}

/// Boundary to the routing layer, implemented by the presentation shell.
pub trait Navigator: Send + Sync {
    /// The view the caller is currently on.
    fn current_view(&self) -> View;

    /// Navigates to `view`.
    fn go_to(&self, view: View);
}
