use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

/// Completion signal for a resource filled in by another thread.
///
/// The consumer calls [`start_loading`](Self::start_loading) once, a producer
/// later resolves it with [`done_loading`](Self::done_loading) or
/// [`loading_failed`](Self::loading_failed). Anything the producer wrote before
/// resolving is visible to a thread returning from [`wait_for_load`](Self::wait_for_load).
#[derive(Debug)]
pub struct AsyncResource {
    state: Mutex<LoadState>,
    cond: Condvar,
}

impl Default for AsyncResource {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncResource {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoadState::NotStarted),
            cond: Condvar::new(),
        }
    }

    /// # Panics
    ///
    /// If loading was already started.
    pub fn start_loading(&self) {
        let mut state = self.state.lock();
        assert_eq!(*state, LoadState::NotStarted, "start_loading called twice");
        *state = LoadState::Loading;
    }

    /// # Panics
    ///
    /// If the resource is not loading.
    pub fn done_loading(&self) {
        self.resolve(LoadState::Loaded);
    }

    /// Marks the load as failed. There is no way back to loading.
    ///
    /// # Panics
    ///
    /// If the resource is not loading.
    pub fn loading_failed(&self) {
        self.resolve(LoadState::Failed);
    }

    fn resolve(&self, terminal: LoadState) {
        let mut state = self.state.lock();
        assert_eq!(*state, LoadState::Loading, "resource resolved while not loading");
        *state = terminal;
        self.cond.notify_all();
    }

    /// Blocks until the load finished, successfully or not.
    pub fn wait_for_load(&self) {
        let mut state = self.state.lock();
        while !state.is_terminal() {
            self.cond.wait(&mut state);
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.state.lock() == LoadState::Loaded
    }

    pub fn is_failed(&self) -> bool {
        *self.state.lock() == LoadState::Failed
    }

    pub fn load_state(&self) -> LoadState {
        *self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn test_wait_until_done() {
        let resource = Arc::new(AsyncResource::new());
        let signalled = Arc::new(AtomicBool::new(false));
        resource.start_loading();
        assert_eq!(resource.load_state(), LoadState::Loading);

        let producer = {
            let resource = Arc::clone(&resource);
            let signalled = Arc::clone(&signalled);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                signalled.store(true, Ordering::SeqCst);
                resource.done_loading();
            })
        };

        let start = Instant::now();
        resource.wait_for_load();
        assert!(signalled.load(Ordering::SeqCst));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(resource.is_loaded());
        producer.join().unwrap();
    }

    #[test]
    fn test_many_waiters() {
        let resource = Arc::new(AsyncResource::new());
        resource.start_loading();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let resource = Arc::clone(&resource);
                thread::spawn(move || {
                    resource.wait_for_load();
                    resource.is_loaded()
                })
            })
            .collect();
        thread::sleep(Duration::from_millis(10));
        resource.done_loading();
        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }
    }

    fn spawn_waiters(
        resource: &Arc<AsyncResource>,
        finished: &Arc<AtomicUsize>,
        count: usize,
    ) -> Vec<thread::JoinHandle<LoadState>> {
        (0..count)
            .map(|_| {
                let resource = Arc::clone(resource);
                let finished = Arc::clone(finished);
                thread::spawn(move || {
                    resource.wait_for_load();
                    finished.fetch_add(1, Ordering::SeqCst);
                    resource.load_state()
                })
            })
            .collect()
    }

    #[test]
    fn test_wait_before_start() {
        let resource = Arc::new(AsyncResource::new());
        let finished = Arc::new(AtomicUsize::new(0));
        let waiters = spawn_waiters(&resource, &finished, 3);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        resource.start_loading();
        thread::sleep(Duration::from_millis(20));
        // starting is not a terminal state
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        resource.done_loading();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), LoadState::Loaded);
        }
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failure_wakes_all_waiters() {
        let resource = Arc::new(AsyncResource::new());
        let finished = Arc::new(AtomicUsize::new(0));
        resource.start_loading();
        let waiters = spawn_waiters(&resource, &finished, 5);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        resource.loading_failed();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), LoadState::Failed);
        }
        assert!(resource.is_failed());
    }

    #[test]
    fn test_failure_is_permanent() {
        let resource = AsyncResource::new();
        resource.start_loading();
        resource.loading_failed();
        resource.wait_for_load();
        resource.wait_for_load();
        assert!(!resource.is_loaded());
        assert!(resource.is_failed());
        assert_eq!(resource.load_state(), LoadState::Failed);
    }

    #[test]
    fn test_not_started() {
        let resource = AsyncResource::default();
        assert!(!resource.is_loaded());
        assert!(!resource.is_failed());
        assert_eq!(resource.load_state(), LoadState::NotStarted);
    }

    #[test]
    #[should_panic(expected = "start_loading called twice")]
    fn test_double_start() {
        let resource = AsyncResource::new();
        resource.start_loading();
        resource.start_loading();
    }

    #[test]
    #[should_panic]
    fn test_done_without_start() {
        AsyncResource::new().done_loading();
    }
}
