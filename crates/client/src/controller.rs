//! Client-side session lifecycle.
//!
//! The controller owns the single [`AuthPhase`] slot and moves it
//! `Unresolved` to `Resolving` to a terminal phase. Reads never touch the
//! network, and every mutating operation settles the slot back onto a
//! non-`Resolving` phase before it returns, whatever the gateway answered.

use std::mem;
use std::sync::{PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::warn;

use bazaar_auth::{SignupFields, User};

use crate::cart::CartSync;
use crate::error::ClientError;
use crate::gateway::AuthGateway;
use crate::navigator::Navigator;
use crate::state::AuthPhase;

/// Holds the current identity for one client surface.
///
/// Auth calls are single-flight: a second login/signup/logout/refresh while
/// one is running fails fast with [`ClientError::AlreadyInFlight`] instead
/// of racing the first.
pub struct SessionController<G, C, N> {
    gateway: G,
    cart: C,
    navigator: N,
    phase: RwLock<AuthPhase>,
    flight: Mutex<()>,
}

impl<G, C, N> SessionController<G, C, N>
where
    G: AuthGateway,
    C: CartSync,
    N: Navigator,
{
    pub fn new(gateway: G, cart: C, navigator: N) -> Self {
        Self {
            gateway,
            cart,
            navigator,
            phase: RwLock::new(AuthPhase::Unresolved),
            flight: Mutex::new(()),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        match self.phase() {
            AuthPhase::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Resolve the session once. After the first resolution this answers
    /// from the slot; [`refresh`](Self::refresh) forces a new round trip.
    pub async fn init(&self) -> Result<AuthPhase, ClientError> {
        let current = self.phase();
        if current != AuthPhase::Unresolved {
            return Ok(current);
        }
        self.resolve().await
    }

    /// Ask the server who this session belongs to, ignoring the slot.
    pub async fn refresh(&self) -> Result<AuthPhase, ClientError> {
        self.resolve().await
    }

    /// Drop to `Anonymous` locally, without a network call.
    pub fn clear(&self) {
        self.set_phase(AuthPhase::Anonymous);
    }

    /// Open a session. On success the phase becomes `Authenticated` and the
    /// cart is synced best-effort (a sync failure is logged and swallowed).
    /// On failure the previous phase is restored and the error re-raised, so
    /// the caller can retry.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(ClientError::AlreadyInFlight);
        };

        let previous = self.set_phase(AuthPhase::Resolving);
        // Both arms settle the slot: `Resolving` never survives this call.
        match self.gateway.login(email, password).await {
            Ok(user) => {
                self.set_phase(AuthPhase::Authenticated(user.clone()));
                self.sync_cart(&user).await;
                Ok(user)
            }
            Err(e) => {
                self.set_phase(previous);
                Err(e)
            }
        }
    }

    /// Register and open a session. Same shape as [`login`](Self::login),
    /// cart sync included.
    pub async fn signup(&self, fields: SignupFields) -> Result<User, ClientError> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(ClientError::AlreadyInFlight);
        };

        let previous = self.set_phase(AuthPhase::Resolving);
        match self.gateway.signup(&fields).await {
            Ok(user) => {
                self.set_phase(AuthPhase::Authenticated(user.clone()));
                self.sync_cart(&user).await;
                Ok(user)
            }
            Err(e) => {
                self.set_phase(previous);
                Err(e)
            }
        }
    }

    /// Close the session. The local phase drops to `Anonymous` whatever the
    /// gateway answers, the navigator is pointed at `/`, and only then is a
    /// gateway error re-raised.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(ClientError::AlreadyInFlight);
        };

        self.set_phase(AuthPhase::Resolving);
        let result = self.gateway.logout().await;

        self.set_phase(AuthPhase::Anonymous);
        self.navigator.navigate("/");
        result
    }

    async fn resolve(&self) -> Result<AuthPhase, ClientError> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(ClientError::AlreadyInFlight);
        };

        let previous = self.set_phase(AuthPhase::Resolving);
        match self.gateway.check().await {
            Ok(Some(user)) => {
                let settled = AuthPhase::Authenticated(user);
                self.set_phase(settled.clone());
                Ok(settled)
            }
            Ok(None) => {
                self.set_phase(AuthPhase::Anonymous);
                Ok(AuthPhase::Anonymous)
            }
            Err(e) => {
                self.set_phase(previous);
                Err(e)
            }
        }
    }

    fn set_phase(&self, next: AuthPhase) -> AuthPhase {
        let mut slot = self.phase.write().unwrap_or_else(PoisonError::into_inner);
        mem::replace(&mut *slot, next)
    }

    async fn sync_cart(&self, user: &User) {
        if let Err(e) = self.cart.sync_with_server(user).await {
            warn!(user_id = %user.id, "cart sync failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use bazaar_actions::ActionError;
    use bazaar_auth::Role;

    struct FakeGateway {
        check: StdMutex<Result<Option<User>, ClientError>>,
        login: StdMutex<Result<User, ClientError>>,
        logout: StdMutex<Result<(), ClientError>>,
        checks: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                check: StdMutex::new(Ok(None)),
                login: StdMutex::new(Err(transport("login not scripted"))),
                logout: StdMutex::new(Ok(())),
                checks: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn resolving_to(user: &User) -> Self {
            let gateway = Self::new();
            *gateway.check.lock().unwrap() = Ok(Some(user.clone()));
            gateway
        }

        fn logging_in(user: &User) -> Self {
            let gateway = Self::new();
            *gateway.login.lock().unwrap() = Ok(user.clone());
            gateway
        }
    }

    #[async_trait]
    impl AuthGateway for Arc<FakeGateway> {
        async fn login(&self, _email: &str, _password: &str) -> Result<User, ClientError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.login.lock().unwrap().clone()
        }

        async fn signup(&self, _fields: &SignupFields) -> Result<User, ClientError> {
            self.login.lock().unwrap().clone()
        }

        async fn logout(&self) -> Result<(), ClientError> {
            self.logout.lock().unwrap().clone()
        }

        async fn check(&self) -> Result<Option<User>, ClientError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.check.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct RecordingCart {
        synced: StdMutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CartSync for Arc<RecordingCart> {
        async fn sync_with_server(&self, user: &User) -> Result<(), ClientError> {
            self.synced.lock().unwrap().push(user.email.clone());
            if self.fail {
                return Err(transport("cart endpoint unreachable"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: StdMutex<Vec<String>>,
    }

    impl Navigator for Arc<RecordingNavigator> {
        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    type TestController =
        SessionController<Arc<FakeGateway>, Arc<RecordingCart>, Arc<RecordingNavigator>>;

    struct Harness {
        gateway: Arc<FakeGateway>,
        cart: Arc<RecordingCart>,
        navigator: Arc<RecordingNavigator>,
        controller: Arc<TestController>,
    }

    fn harness(gateway: FakeGateway) -> Harness {
        harness_with_cart(gateway, RecordingCart::default())
    }

    fn harness_with_cart(gateway: FakeGateway, cart: RecordingCart) -> Harness {
        let gateway = Arc::new(gateway);
        let cart = Arc::new(cart);
        let navigator = Arc::new(RecordingNavigator::default());
        let controller = Arc::new(SessionController::new(
            gateway.clone(),
            cart.clone(),
            navigator.clone(),
        ));
        Harness {
            gateway,
            cart,
            navigator,
            controller,
        }
    }

    fn transport(msg: &str) -> ClientError {
        ClientError::Transport(msg.to_string())
    }

    fn casey() -> User {
        match User::new("casey@example.com", "Casey", Role::Seller) {
            Ok(user) => user,
            Err(e) => panic!("user fixture: {e}"),
        }
    }

    #[tokio::test]
    async fn init_resolves_once_and_reuses_the_answer() {
        let user = casey();
        let h = harness(FakeGateway::resolving_to(&user));

        let first = h.controller.init().await;
        assert_eq!(first, Ok(AuthPhase::Authenticated(user.clone())));
        assert_eq!(h.controller.current_user(), Some(user.clone()));

        let second = h.controller.init().await;
        assert_eq!(second, Ok(AuthPhase::Authenticated(user)));
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn init_lands_anonymous_without_a_session() {
        let h = harness(FakeGateway::new());

        let phase = h.controller.init().await;
        assert_eq!(phase, Ok(AuthPhase::Anonymous));
        assert_eq!(h.controller.current_user(), None);
    }

    #[tokio::test]
    async fn failed_resolution_stays_retryable() {
        let user = casey();
        let h = harness(FakeGateway::new());
        *h.gateway.check.lock().unwrap() = Err(transport("connection refused"));

        let first = h.controller.init().await;
        assert_eq!(first, Err(transport("connection refused")));
        assert_eq!(h.controller.phase(), AuthPhase::Unresolved);

        *h.gateway.check.lock().unwrap() = Ok(Some(user.clone()));
        let retry = h.controller.init().await;
        assert_eq!(retry, Ok(AuthPhase::Authenticated(user)));
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_forces_a_new_resolution() {
        let user = casey();
        let h = harness(FakeGateway::new());

        assert_eq!(h.controller.init().await, Ok(AuthPhase::Anonymous));

        *h.gateway.check.lock().unwrap() = Ok(Some(user.clone()));
        let refreshed = h.controller.refresh().await;
        assert_eq!(refreshed, Ok(AuthPhase::Authenticated(user)));
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn login_authenticates_and_syncs_the_cart() {
        let user = casey();
        let h = harness(FakeGateway::logging_in(&user));

        let logged_in = h.controller.login("casey@example.com", "hunter2").await;
        assert_eq!(logged_in, Ok(user.clone()));
        assert_eq!(h.controller.phase(), AuthPhase::Authenticated(user.clone()));
        assert_eq!(*h.cart.synced.lock().unwrap(), vec![user.email]);
    }

    #[tokio::test]
    async fn failed_login_reraises_and_restores_the_previous_phase() {
        let h = harness(FakeGateway::new());
        assert_eq!(h.controller.init().await, Ok(AuthPhase::Anonymous));

        let denied = ClientError::Action(ActionError::unauthorized("invalid credentials"));
        *h.gateway.login.lock().unwrap() = Err(denied.clone());

        let attempt = h.controller.login("casey@example.com", "wrong").await;
        assert_eq!(attempt, Err(denied));
        assert_eq!(h.controller.phase(), AuthPhase::Anonymous);
        assert!(h.cart.synced.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cart_sync_failure_never_fails_the_login() {
        let user = casey();
        let cart = RecordingCart {
            fail: true,
            ..RecordingCart::default()
        };
        let h = harness_with_cart(FakeGateway::logging_in(&user), cart);

        let logged_in = h.controller.login("casey@example.com", "hunter2").await;
        assert_eq!(logged_in, Ok(user.clone()));
        assert_eq!(h.controller.phase(), AuthPhase::Authenticated(user.clone()));
        assert_eq!(*h.cart.synced.lock().unwrap(), vec![user.email]);
    }

    #[tokio::test]
    async fn signup_behaves_like_login() {
        let user = casey();
        let h = harness(FakeGateway::logging_in(&user));

        let fields = SignupFields {
            email: user.email.clone(),
            password: "hunter2".to_string(),
            name: user.name.clone(),
        };
        let signed_up = h.controller.signup(fields).await;
        assert_eq!(signed_up, Ok(user.clone()));
        assert_eq!(h.controller.phase(), AuthPhase::Authenticated(user.clone()));
        assert_eq!(*h.cart.synced.lock().unwrap(), vec![user.email]);
    }

    #[tokio::test]
    async fn logout_lands_anonymous_and_navigates_home() {
        let user = casey();
        let h = harness(FakeGateway::resolving_to(&user));
        assert!(h.controller.init().await.is_ok());

        let logged_out = h.controller.logout().await;
        assert_eq!(logged_out, Ok(()));
        assert_eq!(h.controller.phase(), AuthPhase::Anonymous);
        assert_eq!(*h.navigator.visits.lock().unwrap(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn logout_failure_still_clears_the_session() {
        let user = casey();
        let h = harness(FakeGateway::resolving_to(&user));
        assert!(h.controller.init().await.is_ok());

        *h.gateway.logout.lock().unwrap() = Err(transport("connection reset"));

        let logged_out = h.controller.logout().await;
        assert_eq!(logged_out, Err(transport("connection reset")));
        assert_eq!(h.controller.phase(), AuthPhase::Anonymous);
        assert_eq!(*h.navigator.visits.lock().unwrap(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn clear_drops_to_anonymous_without_a_network_call() {
        let user = casey();
        let h = harness(FakeGateway::resolving_to(&user));
        assert!(h.controller.init().await.is_ok());

        h.controller.clear();
        assert_eq!(h.controller.phase(), AuthPhase::Anonymous);
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn overlapping_auth_calls_are_rejected() {
        let user = casey();
        let gate = Arc::new(Notify::new());
        let mut gateway = FakeGateway::logging_in(&user);
        gateway.gate = Some(gate.clone());
        let h = harness(gateway);

        let first = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.login("casey@example.com", "hunter2").await })
        };
        while h.controller.phase() != AuthPhase::Resolving {
            tokio::task::yield_now().await;
        }

        let second = h.controller.login("casey@example.com", "hunter2").await;
        assert_eq!(second, Err(ClientError::AlreadyInFlight));
        assert_eq!(
            h.controller.refresh().await,
            Err(ClientError::AlreadyInFlight)
        );
        assert_eq!(h.controller.logout().await, Err(ClientError::AlreadyInFlight));

        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first, Ok(user.clone()));
        assert_eq!(h.controller.phase(), AuthPhase::Authenticated(user));
    }
}
