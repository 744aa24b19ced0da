//! Session orchestration.

use std::sync::{Mutex, MutexGuard};

pub mod controller;
pub mod events;
pub mod hooks;
mod request;

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::lock_unpoisoned;

    #[test]
    fn poisoned_lock_still_yields_its_value() {
        let shared = Arc::new(Mutex::new(vec![1]));
        let writer = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let mut guard = writer.lock().expect("first lock");
            guard.push(2);
            panic!("poison the lock");
        })
        .join();

        assert!(shared.is_poisoned());
        lock_unpoisoned(&shared).push(3);
        assert_eq!(*lock_unpoisoned(&shared), vec![1, 2, 3]);
    }
}
