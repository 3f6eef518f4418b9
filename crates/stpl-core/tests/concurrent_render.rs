//! Concurrent rendering against one engine and cache

use std::sync::{Arc, Barrier};
use std::thread;
use stpl_core::{Engine, EngineConfig, TemplateContext};
use stpl_testkit::MemoryHost;

/// Many threads rendering the same names must never see a broken artifact
#[test]
fn test_concurrent_renders_share_cache() {
    let host = Arc::new(MemoryHost::new().with_file("row", "<{{n}}>"));
    let engine = Arc::new(Engine::new(EngineConfig::default(), host.clone()).unwrap());

    const NUM_THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                for round in 0..20 {
                    let ctx = TemplateContext::new().with("i", i as i64);
                    let result = engine
                        .render(
                            "% for n in range(i, i + 3):\n% include('row', n=n)\n% end\n",
                            "table",
                            &ctx,
                        )
                        .unwrap_or_else(|err| panic!("Thread {} round {}: {}", i, round, err));
                    assert_eq!(result, format!("<{}><{}><{}>", i, i + 1, i + 2));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(engine.cache().contains("table"));
    assert!(engine.cache().contains("row"));
    // racing misses may read more than once, but never once per render
    assert!(host.reads("row") <= NUM_THREADS);
}

/// Invalidations racing renders must only ever yield complete output
#[test]
fn test_concurrent_invalidate_and_render() {
    let engine = Arc::new(
        Engine::new(EngineConfig::default(), Arc::new(MemoryHost::new())).unwrap(),
    );

    const NUM_THREADS: usize = 4;
    let barrier = Arc::new(Barrier::new(NUM_THREADS + 1));

    let renderers: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    let result = engine
                        .render("a{{ 1 + 1 }}b", "page", &TemplateContext::new())
                        .unwrap();
                    assert_eq!(result, "a2b");
                }
            })
        })
        .collect();

    let invalidator = {
        let engine = Arc::clone(&engine);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..50 {
                engine.invalidate("page");
                thread::yield_now();
            }
        })
    };

    for handle in renderers {
        handle.join().unwrap();
    }
    invalidator.join().unwrap();
}
