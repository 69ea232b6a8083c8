//! Route changes requested by the session controller.

/// Host-side navigation. Logout lands the caller back on `/`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that goes nowhere, for headless callers.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}
