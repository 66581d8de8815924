use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

struct Wrapper {
    value: u32,
}

fn handle(addr: usize) -> NativeHandle {
    NativeHandle::from_addr(addr)
}

#[test]
fn register_rejects_null() {
    let registry = HandleRegistry::new();
    let w = Arc::new(Wrapper { value: 1 });
    assert!(!registry.register(NativeHandle::NULL, &w));
    assert!(registry.is_empty());
}

#[test]
fn lookup_null_or_unknown_is_absent() {
    let registry: HandleRegistry<Wrapper> = HandleRegistry::new();
    assert!(registry.lookup(NativeHandle::NULL).is_none());
    assert!(registry.lookup(handle(0x100)).is_none());
}

#[test]
fn lookup_returns_registered_wrapper() {
    let registry = HandleRegistry::new();
    let w = Arc::new(Wrapper { value: 7 });
    assert!(registry.register(handle(0x100), &w));

    let found = registry.lookup(handle(0x100)).unwrap();
    assert!(Arc::ptr_eq(&found, &w));
    assert_eq!(found.value, 7);
}

#[test]
fn registry_does_not_keep_wrappers_alive() {
    let registry = HandleRegistry::new();
    let w = Arc::new(Wrapper { value: 1 });
    registry.register(handle(0x100), &w);
    assert_eq!(Arc::strong_count(&w), 1);

    drop(w);
    assert!(registry.lookup(handle(0x100)).is_none());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn unregister_after_teardown_then_twice() {
    let registry = HandleRegistry::new();
    let w = Arc::new(Wrapper { value: 1 });
    registry.register(handle(0x100), &w);
    drop(w);

    assert!(registry.unregister(handle(0x100)));
    assert!(registry.is_empty());
    // Second unregister is a harmless no-op.
    assert!(!registry.unregister(handle(0x100)));
    assert!(registry.is_empty());
}

#[test]
fn unregister_leaves_live_entry_alone() {
    let registry = HandleRegistry::new();
    let w = Arc::new(Wrapper { value: 1 });
    registry.register(handle(0x100), &w);

    assert!(!registry.unregister(handle(0x100)));
    assert!(registry.contains(handle(0x100)));
}

#[test]
fn second_live_wrapper_is_refused() {
    let registry = HandleRegistry::new();
    let first = Arc::new(Wrapper { value: 1 });
    let second = Arc::new(Wrapper { value: 2 });
    assert!(registry.register(handle(0x100), &first));
    assert!(!registry.register(handle(0x100), &second));
    assert_eq!(registry.lookup(handle(0x100)).unwrap().value, 1);

    // Re-registering the same wrapper is fine.
    assert!(registry.register(handle(0x100), &first));
}

#[test]
fn dead_entry_is_replaced() {
    let registry = HandleRegistry::new();
    let first = Arc::new(Wrapper { value: 1 });
    registry.register(handle(0x100), &first);
    drop(first);

    let second = Arc::new(Wrapper { value: 2 });
    assert!(registry.register(handle(0x100), &second));
    assert_eq!(registry.lookup(handle(0x100)).unwrap().value, 2);
    // The old wrapper's late unregister must not evict the new one.
    assert!(!registry.unregister(handle(0x100)));
    assert!(registry.contains(handle(0x100)));
}

#[test]
fn lookup_or_insert_builds_once() {
    let registry = HandleRegistry::new();
    let built = AtomicUsize::new(0);
    let make = || {
        built.fetch_add(1, Ordering::SeqCst);
        Arc::new(Wrapper { value: 3 })
    };

    let (a, created_a) = registry.lookup_or_insert_with(handle(0x200), make).unwrap();
    let (b, created_b) = registry
        .lookup_or_insert_with(handle(0x200), || Arc::new(Wrapper { value: 99 }))
        .unwrap();
    assert!(created_a);
    assert!(!created_b);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn lookup_or_insert_null_is_none() {
    let registry: HandleRegistry<Wrapper> = HandleRegistry::new();
    assert!(registry
        .lookup_or_insert_with(NativeHandle::NULL, || Arc::new(Wrapper { value: 0 }))
        .is_none());
}

#[test]
fn concurrent_lookups_agree_on_one_wrapper() {
    let registry = HandleRegistry::new();
    let built = AtomicUsize::new(0);

    let wrappers: Vec<Arc<Wrapper>> = std::thread::scope(|s| {
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let registry = &registry;
                let built = &built;
                s.spawn(move || {
                    let (w, _) = registry
                        .lookup_or_insert_with(handle(0x300), || {
                            built.fetch_add(1, Ordering::SeqCst);
                            Arc::new(Wrapper { value: i })
                        })
                        .unwrap();
                    w
                })
            })
            .collect();
        threads.into_iter().map(|t| t.join().unwrap()).collect()
    });

    assert_eq!(built.load(Ordering::SeqCst), 1);
    let first = &wrappers[0];
    assert!(wrappers.iter().all(|w| Arc::ptr_eq(w, first)));
    assert!(wrappers.iter().all(|w| w.value == first.value));
}

#[test]
fn concurrent_register_and_teardown_keeps_map_consistent() {
    let registry = HandleRegistry::new();

    std::thread::scope(|s| {
        for t in 0..4usize {
            let registry = &registry;
            s.spawn(move || {
                for i in 0..200usize {
                    let h = handle(0x1000 + (t * 1000 + i) * 0x10);
                    let (w, _) = registry
                        .lookup_or_insert_with(h, || Arc::new(Wrapper { value: i as u32 }))
                        .unwrap();
                    assert_eq!(registry.lookup(h).unwrap().value, w.value);
                    drop(w);
                    assert!(registry.unregister(h));
                }
            });
        }
    });

    assert!(registry.is_empty());
}

#[test]
fn works_with_trait_objects() {
    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }
    struct Thing;
    impl Named for Thing {
        fn name(&self) -> &str {
            "thing"
        }
    }

    let registry: HandleRegistry<dyn Named> = HandleRegistry::new();
    let thing: Arc<dyn Named> = Arc::new(Thing);
    assert!(registry.register(handle(0x400), &thing));
    assert_eq!(registry.lookup(handle(0x400)).unwrap().name(), "thing");
}
