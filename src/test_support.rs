//! Test support utilities shared across unit and integration tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::rc::Rc;

use tokio::sync::{Mutex, MutexGuard};

/// Target that remembers the last value written into it and reports every
/// write to a shared [`WriteLog`].
#[derive(Clone, Debug)]
pub struct RecordingTarget {
    name: String,
    value: Rc<Cell<Option<u64>>>,
    log: WriteLog,
}

impl RecordingTarget {
    /// Creates a target that has not been written yet.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &WriteLog) -> Self {
        Self {
            name: name.into(),
            value: Rc::new(Cell::new(None)),
            log: log.clone(),
        }
    }

    /// Name used in log entries.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last value written, if any.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        self.value.get()
    }

    /// Stores `value` and appends an entry to the shared log.
    pub fn write(&self, value: u64) {
        self.value.set(Some(value));
        self.log.record(&self.name, value);
    }
}

/// A single recorded write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteEntry {
    /// Name of the target that was written.
    pub target: String,
    /// Value that was written.
    pub value: u64,
}

/// Ordered log of writes shared by a group of [`RecordingTarget`]s.
#[derive(Clone, Debug, Default)]
pub struct WriteLog {
    entries: Rc<RefCell<Vec<WriteEntry>>>,
}

impl WriteLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a write.
    pub fn record(&self, target: &str, value: u64) {
        self.entries.borrow_mut().push(WriteEntry {
            target: target.to_owned(),
            value,
        });
    }

    /// Returns a snapshot of all writes recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<WriteEntry> {
        self.entries.borrow().clone()
    }

    /// Returns `(target, value)` pairs for compact assertions.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, u64)> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| (entry.target.clone(), entry.value))
            .collect()
    }
}

/// Serialises tests that touch `TETHER_*` environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

const ENV_PREFIX: &str = "TETHER_";

/// Scoped `TETHER_*` environment for configuration tests.
///
/// While the guard lives, the only `TETHER_*` variables set are the ones
/// passed in; inherited ones are hidden. Everything is put back on drop.
pub struct EnvGuard {
    saved: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Takes [`ENV_LOCK`], clears inherited `TETHER_*` variables and sets
    /// `pairs`. Keys must be unique.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate keys passed to EnvGuard::set_vars"
        );

        let lock = ENV_LOCK.lock().await;
        let inherited: Vec<OsString> = env::vars_os()
            .map(|(key, _)| key)
            .filter(|key| key.to_str().is_some_and(|name| name.starts_with(ENV_PREFIX)))
            .collect();
        let mut saved = Vec::with_capacity(inherited.len() + pairs.len());
        for key in inherited {
            let old = env::var_os(&key);
            // SAFETY: every mutation happens while `ENV_LOCK` is held.
            unsafe { env::remove_var(&key) };
            saved.push((key, old));
        }
        for (key, value) in pairs {
            let key = OsString::from(key);
            if !saved.iter().any(|(seen, _)| *seen == key) {
                saved.push((key.clone(), None));
            }
            // SAFETY: every mutation happens while `ENV_LOCK` is held.
            unsafe { env::set_var(&key, value) };
        }

        Self { saved, _lock: lock }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.saved {
            // SAFETY: `_lock` is still held while the guard drops.
            unsafe {
                match old {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn env_guard_hides_inherited_variables_until_dropped() {
        {
            let _lock = ENV_LOCK.lock().await;
            // SAFETY: mutation happens while `ENV_LOCK` is held.
            unsafe { env::set_var("TETHER_DURATION_MS", "10") };
        }

        let guard = EnvGuard::set_vars(&[("TETHER_FRAME_INTERVAL_MS", "4")]).await;
        assert_eq!(env::var_os("TETHER_DURATION_MS"), None);
        assert_eq!(
            env::var_os("TETHER_FRAME_INTERVAL_MS"),
            Some(OsString::from("4"))
        );
        drop(guard);

        let _lock = ENV_LOCK.lock().await;
        assert_eq!(
            env::var_os("TETHER_DURATION_MS"),
            Some(OsString::from("10"))
        );
        assert_eq!(env::var_os("TETHER_FRAME_INTERVAL_MS"), None);
        // SAFETY: mutation happens while `ENV_LOCK` is held.
        unsafe { env::remove_var("TETHER_DURATION_MS") };
    }
}
