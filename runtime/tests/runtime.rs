//! Integration tests for the runtime: buses, scheduler and their interplay.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use parking_lot::Mutex;
use rstest::rstest;

use redlilium_runtime::{
    AllServicesInitialized, CommandBus, EventBus, Runtime, RuntimeConfig, ServiceResult,
    ServiceState, SystemService, impl_command, impl_event,
};

fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Foo(u32);
impl_event!(Foo => "test.foo");

#[derive(Debug)]
struct Bar;
impl_event!(Bar);

#[derive(Debug)]
struct Spawn(u32);
impl_command!(Spawn);

fn recording_bus() -> (EventBus, Arc<Mutex<Vec<u32>>>) {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    bus.subscribe(move |foo: &Foo| s.lock().push(foo.0));
    (bus, seen)
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

#[test]
fn send_is_synchronous() {
    init_logging();
    let (bus, seen) = recording_bus();

    bus.send(Foo(1));
    assert_eq!(*seen.lock(), vec![1]);
}

#[rstest]
#[case(&[3, 7])]
#[case(&[1, 2, 3, 4, 5])]
#[case(&[])]
fn drain_preserves_post_order(#[case] values: &[u32]) {
    init_logging();
    let (bus, seen) = recording_bus();

    for &v in values {
        bus.post(Foo(v));
    }
    assert!(seen.lock().is_empty());
    assert_eq!(bus.drain(), values.len());
    assert_eq!(*seen.lock(), values.to_vec());
}

#[test]
fn handlers_run_in_registration_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let order = order.clone();
        bus.subscribe(move |_: &Bar| order.lock().push(name));
    }

    bus.send(Bar);
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[test]
fn one_closure_under_several_tags() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicU32::new(0));
    let handler = {
        let hits = hits.clone();
        Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    let h = handler.clone();
    bus.subscribe(move |_: &Foo| h());
    let h = handler.clone();
    bus.subscribe(move |_: &Bar| h());

    bus.send(Foo(0));
    bus.send(Bar);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn cascade_advances_one_step_per_drain() {
    let bus = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let weak = Arc::downgrade(&bus);
        let seen = seen.clone();
        bus.subscribe(move |foo: &Foo| {
            seen.lock().push(foo.0);
            if let Some(bus) = weak.upgrade() {
                bus.post(Foo(foo.0 + 1));
            }
        });
    }

    bus.post(Foo(0));
    for expected_len in 1..=4 {
        assert_eq!(bus.drain(), 1);
        assert_eq!(seen.lock().len(), expected_len);
    }
    assert_eq!(*seen.lock(), vec![0, 1, 2, 3]);
    assert_eq!(bus.pending_len(), 1);
}

#[test]
fn panicking_handler_is_contained() {
    init_logging();
    let (bus, seen) = recording_bus();
    bus.subscribe(|foo: &Foo| {
        if foo.0 == 13 {
            panic!("unlucky");
        }
    });
    let tail_seen = Arc::new(Mutex::new(Vec::new()));
    let t = tail_seen.clone();
    bus.subscribe(move |foo: &Foo| t.lock().push(foo.0));

    bus.post(Foo(13));
    bus.post(Foo(14));
    assert_eq!(bus.drain(), 2);
    assert_eq!(*seen.lock(), vec![13, 14]);
    assert_eq!(*tail_seen.lock(), vec![13, 14]);
    assert_eq!(bus.subscriber_count::<Foo>(), 3);
}

#[test]
fn post_from_worker_threads() {
    let (bus, seen) = recording_bus();
    let bus = Arc::new(bus);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let bus = bus.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    bus.post(Foo(worker * 100 + i));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(bus.drain(), 100);
    let mut values = seen.lock().clone();
    values.sort_unstable();
    assert_eq!(values.len(), 100);
    assert_eq!(values[0], 0);
    assert_eq!(values[99], 324);
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Journal {
    calls: Mutex<Vec<&'static str>>,
}

impl SystemService for Journal {
    fn on_init(&self) -> Result<ServiceResult, redlilium_runtime::ServiceError> {
        self.calls.lock().push("init");
        Ok(ServiceResult::Complete)
    }

    fn on_tick(&self) -> ServiceResult {
        self.calls.lock().push("tick");
        ServiceResult::Pending
    }

    fn on_term(&self) {
        self.calls.lock().push("term");
    }

    fn needs_tick(&self) -> bool {
        true
    }
}

#[test]
fn unregister_before_first_tick_still_inits_and_terminates_once() {
    init_logging();
    let mut runtime = Runtime::new();
    let journal = Arc::new(Journal::default());

    runtime.register_service(journal.clone());
    runtime.unregister_service::<Journal>();
    for _ in 0..5 {
        runtime.run_once();
    }

    assert_eq!(*journal.calls.lock(), vec!["init", "term"]);
    assert_eq!(runtime.service_state::<Journal>(), Some(ServiceState::Removed));
}

#[test]
fn lifecycle_moves_one_stage_per_tick() {
    let mut runtime = Runtime::new();
    runtime.register_service(Arc::new(Journal::default()));
    runtime.run_once();
    runtime.unregister_service::<Journal>();

    let mut observed = vec![runtime.service_state::<Journal>().unwrap()];
    for _ in 0..3 {
        runtime.run_once();
        observed.push(runtime.service_state::<Journal>().unwrap());
    }
    assert_eq!(
        observed,
        vec![
            ServiceState::PendingShutdown,
            ServiceState::ShuttingDown,
            ServiceState::Completed,
            ServiceState::Removed,
        ]
    );
}

/// Posts a command on tick and counts executed commands.
struct Spawner {
    commands: Arc<CommandBus>,
    executed: Arc<AtomicU32>,
}

impl SystemService for Spawner {
    fn on_init(&self) -> Result<ServiceResult, redlilium_runtime::ServiceError> {
        let executed = self.executed.clone();
        self.commands.subscribe(move |spawn: &Spawn| {
            executed.fetch_add(spawn.0, Ordering::SeqCst);
        });
        Ok(ServiceResult::Complete)
    }

    fn needs_tick(&self) -> bool {
        true
    }

    fn on_tick(&self) -> ServiceResult {
        self.commands.post(Spawn(1));
        ServiceResult::Pending
    }
}

#[test]
fn commands_posted_by_services_run_on_the_next_frame() {
    let mut runtime = Runtime::new();
    let executed = Arc::new(AtomicU32::new(0));
    runtime.register_service(Arc::new(Spawner {
        commands: runtime.commands().clone(),
        executed: executed.clone(),
    }));

    // Frame 1: command bus drains (empty), spawner posts.
    runtime.run_once();
    assert_eq!(executed.load(Ordering::SeqCst), 0);
    // Frame 2: the command posted in frame 1 runs.
    runtime.run_once();
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[test]
fn all_services_initialized_is_announced() {
    let mut runtime = Runtime::new();
    let announced = Arc::new(AtomicU32::new(0));
    let a = announced.clone();
    runtime.events().subscribe(move |_: &AllServicesInitialized| {
        a.fetch_add(1, Ordering::SeqCst);
    });

    // Posted at the end of frame 1, delivered by the event bus in frame 2.
    runtime.run_once();
    runtime.run_once();
    runtime.run_once();
    assert_eq!(announced.load(Ordering::SeqCst), 1);
}

#[test]
fn announcement_can_be_disabled() {
    let config = RuntimeConfig::from_toml_str("[scheduler]\nannounce_initialized = false\n")
        .unwrap();
    let mut runtime = Runtime::with_config(config);
    let announced = Arc::new(AtomicU32::new(0));
    let a = announced.clone();
    runtime.events().subscribe(move |_: &AllServicesInitialized| {
        a.fetch_add(1, Ordering::SeqCst);
    });

    runtime.run_once();
    runtime.run_once();
    assert_eq!(announced.load(Ordering::SeqCst), 0);
}

#[test]
fn shutdown_flushes_posted_events() {
    let mut runtime = Runtime::new();
    let seen = Arc::new(AtomicU32::new(0));
    let s = seen.clone();
    runtime.events().subscribe(move |foo: &Foo| {
        s.fetch_add(foo.0, Ordering::SeqCst);
    });

    runtime.events().post(Foo(9));
    runtime.shutdown();
    assert_eq!(seen.load(Ordering::SeqCst), 9);
    assert!(runtime.scheduler().is_empty());
}
