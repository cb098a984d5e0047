use corewire::{
    ComponentDescriptor, Container, Instance, LifecycleHook,
};
use std::sync::Arc;
use std::sync::Mutex;

struct Message {
    text: String,
}

struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn new() -> Arc<Self> {
        Arc::new(Self { events: Mutex::new(Vec::new()) })
    }

    fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

struct RecordingHook {
    tag: &'static str,
    log: Arc<EventLog>,
}

impl LifecycleHook for RecordingHook {
    fn before_completion(
        &self,
        instance: &Instance,
        descriptor: &ComponentDescriptor,
        _container: &Container,
    ) -> Option<Instance> {
        self.log.push(format!("{}:before:{}", self.tag, descriptor.name()));
        Some(instance.clone())
    }

    fn after_completion(
        &self,
        instance: &Instance,
        descriptor: &ComponentDescriptor,
        _container: &Container,
    ) -> Option<Instance> {
        self.log.push(format!("{}:after:{}", self.tag, descriptor.name()));
        Some(instance.clone())
    }
}

fn message_container() -> Container {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::per_request::<Message>("message")
                .construct_with(|| Message { text: "original".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container
}

#[test]
fn hooks_run_in_registration_order_for_both_phases() {
    let log = EventLog::new();
    let container = message_container();
    container.add_hook(Arc::new(RecordingHook { tag: "one", log: log.clone() }));
    container.add_hook(Arc::new(RecordingHook { tag: "two", log: log.clone() }));
    container.refresh().unwrap();

    container.get_component("message").unwrap();
    assert_eq!(
        log.take(),
        vec![
            "one:before:message",
            "two:before:message",
            "one:after:message",
            "two:after:message"
        ]
    );
}

#[test]
fn hook_can_replace_the_instance() {
    struct Rewriter;
    impl LifecycleHook for Rewriter {
        fn after_completion(
            &self,
            instance: &Instance,
            _descriptor: &ComponentDescriptor,
            _container: &Container,
        ) -> Option<Instance> {
            let original = instance.downcast_ref::<Message>()?;
            Some(Arc::new(Message { text: format!("{} (rewritten)", original.text) }))
        }
    }

    let container = message_container();
    container.add_hook(Arc::new(Rewriter));
    container.refresh().unwrap();

    let message = container.get_component_as::<Message>("message").unwrap();
    assert_eq!(message.text, "original (rewritten)");
}

#[test]
fn none_stops_the_chain_and_keeps_the_current_instance() {
    struct Stopper {
        log: Arc<EventLog>,
    }
    impl LifecycleHook for Stopper {
        fn after_completion(
            &self,
            _instance: &Instance,
            _descriptor: &ComponentDescriptor,
            _container: &Container,
        ) -> Option<Instance> {
            self.log.push("stopper");
            None
        }
    }

    let log = EventLog::new();
    let container = message_container();
    container.add_hook(Arc::new(Stopper { log: log.clone() }));
    container.add_hook(Arc::new(RecordingHook { tag: "late", log: log.clone() }));
    container.refresh().unwrap();

    let message = container.get_component_as::<Message>("message").unwrap();
    assert_eq!(message.text, "original");

    // The late hook still saw the before phase; the after phase stopped at
    // the stop signal.
    let events = log.take();
    assert!(events.contains(&"late:before:message".to_string()));
    assert!(events.contains(&"stopper".to_string()));
    assert!(!events.contains(&"late:after:message".to_string()));
}

#[test]
fn hooks_added_after_refresh_take_effect_on_the_next_refresh() {
    let log = EventLog::new();
    let container = message_container();
    container.refresh().unwrap();

    container.add_hook(Arc::new(RecordingHook { tag: "new", log: log.clone() }));
    container.get_component("message").unwrap();
    assert!(log.take().is_empty());

    container.refresh().unwrap();
    container.get_component("message").unwrap();
    assert!(!log.take().is_empty());
}
