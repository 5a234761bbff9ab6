//! Builder for handler configuration.

use std::fmt;
use std::time::Duration;

use super::error::CallbackError;
use super::options::{FailurePolicy, SyncOptions};

/// Reads the current value from a source.
pub type Getter<S, V> = Box<dyn Fn(&S) -> Result<V, CallbackError>>;

/// Writes a value into one target.
pub type Setter<T, V> = Box<dyn Fn(&T, &V) -> Result<(), CallbackError>>;

/// Configuration consumed by [`super::SyncHandler::new`].
///
/// Starts from [`SyncOptions::default`]; every builder call overrides one
/// key and leaves the rest alone. The getter and setter are required for
/// copying but are not checked here: a handler missing either fails on the
/// first frame that needs it.
pub struct HandlerConfig<S, T, V> {
    pub(super) getter: Option<Getter<S, V>>,
    pub(super) setter: Option<Setter<T, V>>,
    pub(super) options: SyncOptions,
}

impl<S, T, V> Default for HandlerConfig<S, T, V> {
    fn default() -> Self {
        Self {
            getter: None,
            setter: None,
            options: SyncOptions::default(),
        }
    }
}

impl<S, T, V> fmt::Debug for HandlerConfig<S, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl<S, T, V> HandlerConfig<S, T, V>
where
    S: 'static,
    T: 'static,
    V: 'static,
{
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an infallible getter.
    #[must_use]
    pub fn getter(self, getter: impl Fn(&S) -> V + 'static) -> Self {
        self.try_getter(move |source: &S| Ok(getter(source)))
    }

    /// Sets a getter that may fail.
    #[must_use]
    pub fn try_getter(
        mut self,
        getter: impl Fn(&S) -> Result<V, CallbackError> + 'static,
    ) -> Self {
        self.getter = Some(Box::new(getter));
        self
    }

    /// Sets an infallible setter.
    #[must_use]
    pub fn setter(self, setter: impl Fn(&T, &V) + 'static) -> Self {
        self.try_setter(move |item: &T, value: &V| {
            setter(item, value);
            Ok(())
        })
    }

    /// Sets a setter that may fail.
    #[must_use]
    pub fn try_setter(
        mut self,
        setter: impl Fn(&T, &V) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Overrides how long each started loop runs.
    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.options.duration = duration;
        self
    }

    /// Overrides the reaction to getter and setter failures.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.failure_policy = policy;
        self
    }

    /// Replaces every option at once, typically with values loaded from
    /// [`crate::TetherConfig`].
    #[must_use]
    pub const fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }
}
