use axerrno::AxError;
use axhdcp::{
    HandlerType, HdcpPort, IntrHandler, PhyIfAdaptor, PhyInterface, PortCallback, PortConfig,
    PortDirection, PortRegistry,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Adaptor that records causes and notifies on bit 2.
struct MockAdaptor {
    causes: Mutex<Vec<u32>>,
}

impl MockAdaptor {
    const AUTH_BIT: u32 = 0x4;

    fn new() -> Self {
        Self {
            causes: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<u32> {
        self.causes.lock().unwrap().clone()
    }
}

impl PhyIfAdaptor for MockAdaptor {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn intr_handler(&self) -> Option<&dyn IntrHandler> {
        Some(self)
    }
}

impl IntrHandler for MockAdaptor {
    fn handle_interrupt(&self, port: &HdcpPort, cause: u32) {
        self.causes.lock().unwrap().push(cause);
        if cause & Self::AUTH_BIT != 0 {
            port.notify(HandlerType::AUTHENTICATE);
        }
    }
}

fn config() -> PortConfig {
    PortConfig::new(0, PortDirection::Rx, PhyInterface::Hdmi)
}

fn counting_callback(tag: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> PortCallback {
    let log = Arc::clone(log);
    Arc::new(move || log.lock().unwrap().push(tag))
}

#[test]
fn test_register_dispatch_reregister() {
    let registry = PortRegistry::new();
    let adaptor = Arc::new(MockAdaptor::new());
    let id = registry
        .init_port_with_adaptor(config(), Some(adaptor.clone()))
        .unwrap();
    let port = registry.get_port(id).unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let f1 = counting_callback("f1", &calls);
    registry
        .set_callback(id, HandlerType::AUTHENTICATE, Arc::clone(&f1))
        .expect("register F1");

    registry.handle_interrupt(id, 0x4);
    assert_eq!(adaptor.recorded(), [0x4]);
    assert_eq!(port.stats().interrupts(), 1);
    assert_eq!(*calls.lock().unwrap(), ["f1"]);

    let f2 = counting_callback("f2", &calls);
    registry
        .set_callback(id, HandlerType::AUTHENTICATE, Arc::clone(&f2))
        .expect("register F2");
    assert!(Arc::ptr_eq(&port.auth_callback().unwrap(), &f2));

    let result = registry.set_callback(id, HandlerType(999), Arc::clone(&f1));
    assert_eq!(result, Err(AxError::InvalidInput));
    assert!(Arc::ptr_eq(&port.auth_callback().unwrap(), &f2));

    // Only the replacement runs from now on.
    registry.handle_interrupt(id, 0x4 | 0x1);
    assert_eq!(*calls.lock().unwrap(), ["f1", "f2"]);
    assert_eq!(port.stats().interrupts(), 2);
}

#[test]
fn test_sentinel_causes_forwarded() {
    let adaptor = Arc::new(MockAdaptor::new());
    let port = HdcpPort::new(axhdcp::PortId(1), config(), Some(adaptor.clone()));

    for cause in [0x1, 0xFFFF_FFFF, 0x0] {
        port.handle_interrupt(cause);
    }

    assert_eq!(adaptor.recorded(), [0x1, 0xFFFF_FFFF, 0x0]);
    assert_eq!(port.stats().interrupts(), 3);
}

#[test]
fn test_builtin_hdmi_tx_drops_interrupts() {
    let registry = PortRegistry::new();
    let id = registry
        .init_port(PortConfig::new(2, PortDirection::Tx, PhyInterface::Hdmi))
        .unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let hits_clone = Arc::clone(&hits);
    registry
        .set_callback(
            id,
            HandlerType::AUTHENTICATE,
            Arc::new(move || {
                hits_clone.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    registry.handle_interrupt(id, 0xFFFF_FFFF);
    assert_eq!(registry.get_port_stats(id), Some(0));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_interrupts_counted_once_each() {
    const THREADS: u32 = 4;
    const PER_THREAD: u32 = 1000;

    let registry = Arc::new(PortRegistry::new());
    let adaptor = Arc::new(MockAdaptor::new());
    let id = registry
        .init_port_with_adaptor(config(), Some(adaptor.clone()))
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    registry.handle_interrupt(id, (t << 16) | (i & !MockAdaptor::AUTH_BIT));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = u64::from(THREADS * PER_THREAD);
    assert_eq!(registry.get_port_stats(id), Some(total));
    assert_eq!(adaptor.recorded().len() as u64, total);
}

#[test]
fn test_reregister_during_dispatch() {
    let registry = Arc::new(PortRegistry::new());
    let adaptor = Arc::new(MockAdaptor::new());
    let id = registry
        .init_port_with_adaptor(config(), Some(adaptor.clone()))
        .unwrap();
    let a_hits = Arc::new(AtomicU32::new(0));
    let b_hits = Arc::new(AtomicU32::new(0));

    let make = |hits: &Arc<AtomicU32>| -> PortCallback {
        let hits = Arc::clone(hits);
        Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };
    let a = make(&a_hits);
    let b = make(&b_hits);
    registry
        .set_callback(id, HandlerType::AUTHENTICATE, Arc::clone(&a))
        .unwrap();

    let dispatcher = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..500 {
                registry.handle_interrupt(id, MockAdaptor::AUTH_BIT);
            }
        })
    };
    for i in 0..500 {
        let next = if i % 2 == 0 { &b } else { &a };
        registry
            .set_callback(id, HandlerType::AUTHENTICATE, Arc::clone(next))
            .unwrap();
    }
    dispatcher.join().unwrap();

    // Every dispatch delivered to exactly one of the two callbacks.
    assert_eq!(
        a_hits.load(Ordering::SeqCst) + b_hits.load(Ordering::SeqCst),
        500
    );
}

#[test]
fn test_teardown_stops_dispatch() {
    let registry = PortRegistry::new();
    let adaptor = Arc::new(MockAdaptor::new());
    let id = registry
        .init_port_with_adaptor(config(), Some(adaptor.clone()))
        .unwrap();

    registry.handle_interrupt(id, 0x1);
    registry.teardown(id).unwrap();
    registry.handle_interrupt(id, 0x2);

    assert_eq!(adaptor.recorded(), [0x1]);
    assert_eq!(registry.port_count(), 0);
}
