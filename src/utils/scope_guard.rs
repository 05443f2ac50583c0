/// Runs a closure once when dropped, including on early return or task abort.
pub struct ScopeGuard<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> ScopeGuard<F> {
    pub fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn runs_once_on_drop() {
        let calls = Cell::new(0);
        {
            let _guard = ScopeGuard::new(|| calls.set(calls.get() + 1));
            assert_eq!(calls.get(), 0);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn runs_on_early_return() {
        fn bail(calls: &Cell<u32>) -> Option<()> {
            let _guard = ScopeGuard::new(|| calls.set(calls.get() + 1));
            None?;
            calls.set(100);
            Some(())
        }

        let calls = Cell::new(0);
        assert!(bail(&calls).is_none());
        assert_eq!(calls.get(), 1);
    }
}
