//! Console integration tests
//! Run with: cargo test --test console_test

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, Weak};
use std::thread;

use remote_console::{
    listener_fn, Command, CommandParser, Connection, Connections, Console, ConsoleError, IoError, IoModule,
    ListenerError, Message, MessageListener,
};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Debug)]
struct MockupConnection {
    remote_address: String,
    console: Weak<Console>,
}

impl MockupConnection {
    fn new(console: &Arc<Console>, remote_address: &str) -> Arc<Self> {
        Arc::new(Self {
            remote_address: remote_address.to_string(),
            console: Arc::downgrade(console),
        })
    }
}

impl Connection for MockupConnection {
    fn id(&self) -> &str {
        &self.remote_address
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    fn console(&self) -> Option<Arc<Console>> {
        self.console.upgrade()
    }

    fn send(&self, _message: &Message) -> Result<(), IoError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockupNetModule {
    init_calls: AtomicUsize,
    start_calls: AtomicUsize,
    close_calls: AtomicUsize,
    count_calls: AtomicUsize,
    enumerate_calls: AtomicUsize,
    fail_start: AtomicBool,
    connection_count: AtomicUsize,
    connections: Mutex<Vec<Arc<dyn Connection>>>,
}

impl IoModule for MockupNetModule {
    fn init(&self, _console: Weak<Console>) -> Result<(), IoError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn start(&self) -> Result<(), IoError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(IoError::Io(io::Error::new(io::ErrorKind::AddrInUse, "port in use")));
        }
        Ok(())
    }

    fn close(&self) -> Result<(), IoError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn connection_count(&self) -> usize {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.connection_count.load(Ordering::SeqCst)
    }

    fn connections(&self) -> Result<Connections<'_>, IoError> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.connections.lock().unwrap().clone();
        Ok(Box::new(snapshot.into_iter()))
    }
}

fn setup() -> (Arc<MockupNetModule>, Arc<Console>) {
    ensure_init();
    let io = Arc::new(MockupNetModule::default());
    let console = Console::new(io.clone()).unwrap();
    (io, console)
}

fn message(console: &Arc<Console>, text: &str) -> Message {
    Message::new(Arc::clone(console), MockupConnection::new(console, "RemoteAddress"), text)
}

fn flag_listener(flag: &Arc<AtomicBool>) -> Arc<dyn MessageListener> {
    let flag = Arc::clone(flag);
    listener_fn(move |_| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn test_constructor_initialises_module_once() {
    let (io, console) = setup();

    assert_eq!(io.init_calls.load(Ordering::SeqCst), 1);
    let stored = Arc::as_ptr(console.io_module()) as *const ();
    assert!(std::ptr::eq(stored, Arc::as_ptr(&io) as *const ()));
}

#[test]
fn test_display() {
    let (io, console) = setup();
    assert_eq!(console.to_string(), format!("Console({:?})", io));
}

#[test]
fn test_builder_identity_fields() {
    ensure_init();
    let console = Console::builder(Arc::new(MockupNetModule::default()))
        .host("console.local")
        .port(9001)
        .http_url("http://console.local:9001/")
        .websocket_url("ws://console.local:9001/ws")
        .build()
        .unwrap();

    assert_eq!(console.host(), "console.local");
    assert_eq!(console.port(), 9001);
    assert_eq!(console.http_url(), Some("http://console.local:9001/"));
    assert_eq!(console.websocket_url(), Some("ws://console.local:9001/ws"));
}

#[test]
fn test_start() {
    let (io, console) = setup();
    console.start().unwrap();
    assert_eq!(io.start_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_start_failure_propagates_unchanged() {
    let (io, console) = setup();
    io.fail_start.store(true, Ordering::SeqCst);

    let err = console.start().unwrap_err();
    match err {
        IoError::Io(e) => {
            assert_eq!(e.kind(), io::ErrorKind::AddrInUse);
            assert_eq!(e.to_string(), "port in use");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_close() {
    let (io, console) = setup();
    console.close().unwrap();
    assert_eq!(io.close_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_message_listener_execution() {
    let (_io, console) = setup();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    console.add_message_listener(listener_fn(move |m| {
        sink.lock().unwrap().push(m.text().to_string());
        Ok(())
    }));
    console.supply_message(&message(&console, "  Test  "));

    assert_eq!(*received.lock().unwrap(), vec!["Test".to_string()]);
}

#[test]
fn test_multiple_message_listener_execution() {
    let (_io, console) = setup();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..3 {
        let order = Arc::clone(&order);
        console.add_message_listener(listener_fn(move |_| {
            order.lock().unwrap().push(i);
            Ok(())
        }));
    }
    console.supply_message(&message(&console, "Test"));

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_message_listener_removal() {
    let (_io, console) = setup();
    let called = Arc::new(AtomicBool::new(false));
    let listener = flag_listener(&called);

    console.add_message_listener(listener.clone());
    assert!(console.remove_message_listener(&listener));
    console.supply_message(&message(&console, "Test"));

    assert!(!called.load(Ordering::SeqCst));
    assert!(!console.remove_message_listener(&listener));
}

#[test]
fn test_failing_listener_does_not_block_later_listener() {
    let (_io, console) = setup();
    let called = Arc::new(AtomicBool::new(false));

    console.add_message_listener(listener_fn(|_| Err(ListenerError::Failed("broken".to_string()))));
    console.add_message_listener(flag_listener(&called));
    console.supply_message(&message(&console, "Test"));

    assert!(called.load(Ordering::SeqCst));
}

#[test]
fn test_get_connections_count() {
    let (io, console) = setup();
    io.connection_count.store(101, Ordering::SeqCst);

    assert_eq!(console.connection_count(), 101);
    assert_eq!(io.count_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_get_connections() {
    let (io, console) = setup();
    let expected: HashSet<String> = ["RemoteAddress1", "RemoteAddress2", "RemoteAddress3"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    {
        let mut connections = io.connections.lock().unwrap();
        for address in &expected {
            connections.push(MockupConnection::new(&console, address));
        }
    }

    let collected: HashSet<String> = console
        .connections()
        .unwrap()
        .map(|c| c.remote_address().to_string())
        .collect();

    assert_eq!(collected, expected);
    assert_eq!(io.enumerate_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_command_from_message() {
    let (_io, console) = setup();
    let parser = CommandParser::new("/");

    let command: Command = parser.parse(&message(&console, "/ban alice 10m")).unwrap();
    assert_eq!(command.name(), "ban");
    assert_eq!(command.args_count(), 2);
    assert_eq!(command.arg(1).unwrap(), "10m");
    assert!(matches!(command.arg(2), Err(ConsoleError::OutOfRange { index: 2, len: 2 })));
}

#[test]
fn test_concurrent_supply_and_registration() {
    let (_io, console) = setup();
    let delivered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&delivered);
    console.add_message_listener(listener_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    let suppliers: Vec<_> = (0..4)
        .map(|_| {
            let console = Arc::clone(&console);
            thread::spawn(move || {
                for _ in 0..250 {
                    console.supply_message(&message(&console, "tick"));
                }
            })
        })
        .collect();

    let churn = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            for _ in 0..100 {
                let listener: Arc<dyn MessageListener> = listener_fn(|_| Ok(()));
                console.add_message_listener(listener.clone());
                assert!(console.remove_message_listener(&listener));
            }
        })
    };

    for handle in suppliers {
        handle.join().unwrap();
    }
    churn.join().unwrap();

    assert_eq!(delivered.load(Ordering::SeqCst), 1000);
    assert_eq!(console.listener_count(), 1);
}
