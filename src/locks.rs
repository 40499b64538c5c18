/*!
 * Per-path advisory locking for mutating operations
 *
 * Two taxonomy paths conflict when one is a prefix of the other: deleting
 * `CS/5` must not interleave with an upload into `CS/5/DS/2023`, while
 * uploads into different branches proceed independently.
 */

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::types::TaxonomyPath;

#[derive(Debug, Default)]
struct LockState {
    held: Vec<TaxonomyPath>,
}

impl LockState {
    fn conflicts(&self, path: &TaxonomyPath) -> bool {
        self.held.iter().any(|held| {
            held.segments().starts_with(path.segments())
                || path.segments().starts_with(held.segments())
        })
    }
}

/// Registry of paths currently being mutated
#[derive(Debug, Default, Clone)]
pub struct PathLocks {
    inner: Arc<(Mutex<LockState>, Condvar)>,
}

/// Releases its path when dropped
#[derive(Debug)]
pub struct PathGuard {
    locks: PathLocks,
    path: TaxonomyPath,
}

impl PathLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no overlapping path is held, then hold `path`
    pub fn lock(&self, path: &TaxonomyPath) -> PathGuard {
        let (state, available) = &*self.inner;
        let mut state = recover(state.lock());
        while state.conflicts(path) {
            trace!(path = %path, "waiting for overlapping operation");
            state = available.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.held.push(path.clone());

        PathGuard {
            locks: self.clone(),
            path: path.clone(),
        }
    }

    /// Hold `path` only if nothing overlapping is held right now
    pub fn try_lock(&self, path: &TaxonomyPath) -> Option<PathGuard> {
        let (state, _) = &*self.inner;
        let mut state = recover(state.lock());
        if state.conflicts(path) {
            return None;
        }
        state.held.push(path.clone());

        Some(PathGuard {
            locks: self.clone(),
            path: path.clone(),
        })
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        let (state, available) = &*self.locks.inner;
        let mut state = recover(state.lock());
        if let Some(pos) = state.held.iter().position(|p| p == &self.path) {
            state.held.swap_remove(pos);
        }
        available.notify_all();
    }
}

fn recover<'a>(
    result: Result<MutexGuard<'a, LockState>, PoisonError<MutexGuard<'a, LockState>>>,
) -> MutexGuard<'a, LockState> {
    result.unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn path(segments: &[&str]) -> TaxonomyPath {
        TaxonomyPath::new(segments).unwrap()
    }

    #[test]
    fn test_overlapping_paths_conflict() {
        let locks = PathLocks::new();
        let _guard = locks.lock(&path(&["CS", "5"]));

        assert!(locks.try_lock(&path(&["CS", "5", "DS", "2023"])).is_none());
        assert!(locks.try_lock(&path(&["CS"])).is_none());
        assert!(locks.try_lock(&path(&["CS", "5"])).is_none());
        assert!(locks.try_lock(&path(&["CS", "6"])).is_some());
        assert!(locks.try_lock(&path(&["EE"])).is_some());
    }

    #[test]
    fn test_release_on_drop() {
        let locks = PathLocks::new();
        {
            let _guard = locks.lock(&path(&["CS"]));
            assert!(locks.try_lock(&path(&["CS", "5"])).is_none());
        }
        assert!(locks.try_lock(&path(&["CS", "5"])).is_some());
    }

    #[test]
    fn test_waiter_blocks_until_release() {
        let locks = PathLocks::new();
        let released = Arc::new(AtomicBool::new(false));

        let guard = locks.lock(&path(&["CS"]));
        let waiter = {
            let locks = locks.clone();
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _guard = locks.lock(&path(&["CS", "5", "DS", "2023"]));
                released.load(Ordering::SeqCst)
            })
        };

        thread::sleep(Duration::from_millis(50));
        released.store(true, Ordering::SeqCst);
        drop(guard);

        assert!(waiter.join().unwrap());
    }
}
