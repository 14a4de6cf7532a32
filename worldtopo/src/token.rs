//! Lifecycle of the short-lived token required by the IGN France tile servers.
//!
//! The token is kept for as long as tiles keep being requested. Activity is checked once per
//! [`TokenOptions::tick_interval`]: the token is renewed every
//! [`TokenOptions::renewal_period`] active periods, and released after a period with no
//! activity. Next [`TokenLifecycle::acquire`] starts over.

use std::{cell::RefCell, rc::Rc};

use instant::Instant;

use crate::options::TokenOptions;

/// Remote service handing out the tokens.
///
/// Calls must not block. Tokens come back later, either pushed with
/// [`TokenLifecycle::deliver`] or pulled through [`TokenIssuer::poll_token`].
pub trait TokenIssuer {
    /// Ask for a new token, chained to the `previous` one if there is one.
    fn request(&mut self, previous: Option<&str>);

    /// Give the token back, fire and forget.
    fn release(&mut self, token: Option<&str>);

    /// Token issued since the last call, if any.
    fn poll_token(&mut self) -> Option<String> {
        None
    }
}

/// Single token stream, shared by every layer of a provider.
pub type SharedToken = Rc<RefCell<TokenLifecycle>>;

pub struct TokenLifecycle {
    options: TokenOptions,
    issuer: Box<dyn TokenIssuer>,
    token: Option<String>,

    /// Active periods left until the token is renewed.
    ttl: u32,

    /// Tokens acquired since the last tick.
    activity: u64,

    /// `None` when the cycle is dormant.
    next_tick: Option<Instant>,
}

impl TokenLifecycle {
    /// Create the lifecycle and run the first tick, which requests the first token.
    pub fn new(options: TokenOptions, issuer: impl TokenIssuer + 'static) -> Self {
        let mut lifecycle = Self {
            options,
            issuer: Box::new(issuer),
            token: None,
            ttl: 1,
            activity: 1,
            next_tick: None,
        };
        lifecycle.tick();
        lifecycle
    }

    pub fn shared(self) -> SharedToken {
        Rc::new(RefCell::new(self))
    }

    /// Count a tile request and return the token to put in its URL, `None` if it was not
    /// issued yet. Restarts a dormant cycle.
    pub fn acquire(&mut self) -> Option<String> {
        self.receive();
        self.activity += 1;

        if self.next_tick.is_none() {
            self.tick();
        }

        self.token.clone()
    }

    /// Check the activity of the period which just ended.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.receive();

        if self.activity > 0 {
            self.activity = 0;
            self.next_tick = Some(now + self.options.tick_interval);

            self.ttl = self.ttl.saturating_sub(1);
            if self.ttl == 0 {
                self.ttl = self.options.renewal_period.max(1);
                log::debug!("Requesting a new token.");
                self.issuer.request(self.token.as_deref());
            }
        } else {
            log::debug!("No tiles requested recently, releasing the token.");
            self.issuer.release(self.token.as_deref());
            self.token = None;
            self.ttl = 1;
            self.next_tick = None;
        }
    }

    /// Apply tokens issued in the meantime and tick if the period is over. Hosts call it from
    /// their timer or event loop.
    pub fn poll(&mut self, now: Instant) {
        self.receive();

        if self.next_tick.is_some_and(|due| due <= now) {
            self.tick_at(now);
        }
    }

    /// Store a token that the issuer has just handed out. Tokens arriving after a release are
    /// stored too, and superseded by the next cycle.
    pub fn deliver(&mut self, token: String) {
        log::debug!("Got a new token.");
        self.token = Some(token);
    }

    fn receive(&mut self) {
        while let Some(token) = self.issuer.poll_token() {
            self.deliver(token);
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// When the next tick is due, `None` if the cycle is dormant.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_tick.is_some()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Request(Option<String>),
        Release(Option<String>),
    }

    /// Issuer recording the calls, with tokens to hand out queued by the test.
    #[derive(Clone, Default)]
    pub struct FakeIssuer {
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub pending: Rc<RefCell<VecDeque<String>>>,
    }

    impl FakeIssuer {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        pub fn issue(&self, token: &str) {
            self.pending.borrow_mut().push_back(token.to_owned());
        }
    }

    impl TokenIssuer for FakeIssuer {
        fn request(&mut self, previous: Option<&str>) {
            self.calls
                .borrow_mut()
                .push(Call::Request(previous.map(str::to_owned)));
        }

        fn release(&mut self, token: Option<&str>) {
            self.calls
                .borrow_mut()
                .push(Call::Release(token.map(str::to_owned)));
        }

        fn poll_token(&mut self) -> Option<String> {
            self.pending.borrow_mut().pop_front()
        }
    }
}
