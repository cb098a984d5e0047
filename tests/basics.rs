use corewire::{ComponentDescriptor, Container, CoreError};
use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Database {
    url: String,
}

struct Counter;

#[test]
fn shared_component_resolves_to_same_instance() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "postgres://localhost".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    let first = container.get_component_as::<Database>("db").unwrap();
    let second = container.get_component_as::<Database>("db").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.url, "postgres://localhost");
}

#[test]
fn per_request_component_is_fresh_every_time() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::per_request::<Counter>("counter")
                .construct_with(|| Counter)
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    let first = container.get_component_as::<Counter>("counter").unwrap();
    let second = container.get_component_as::<Counter>("counter").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn duplicate_registration_is_rejected_and_first_wins() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "first".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();

    let result = container.register(
        ComponentDescriptor::shared::<Database>("db")
            .construct_with(|| Database { url: "second".to_string() })
            .build()
            .unwrap(),
    );
    assert!(matches!(result, Err(CoreError::InvalidRegistration(_))));

    container.refresh().unwrap();
    let db = container.get_component_as::<Database>("db").unwrap();
    assert_eq!(db.url, "first");
}

#[test]
fn empty_name_is_rejected() {
    let container = Container::new();
    let result = container.register(
        ComponentDescriptor::shared::<Counter>("")
            .construct_with(|| Counter)
            .build()
            .unwrap(),
    );
    assert!(matches!(result, Err(CoreError::InvalidRegistration(_))));
}

#[test]
fn by_type_lookup_finds_the_unique_match() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "x".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container
        .register(
            ComponentDescriptor::shared::<Counter>("counter")
                .construct_with(|| Counter)
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    let db = container.get_component_by_type::<Database>().unwrap();
    assert_eq!(db.url, "x");
}

#[test]
fn by_type_lookup_with_no_match_fails() {
    let container = Container::new();
    container.refresh().unwrap();
    assert!(matches!(
        container.get_component_by_type::<Database>(),
        Err(CoreError::NotFoundByType(_))
    ));
}

#[test]
fn by_type_lookup_with_two_matches_is_ambiguous() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("primary")
                .construct_with(|| Database { url: "a".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container
        .register(
            ComponentDescriptor::shared::<Database>("replica")
                .construct_with(|| Database { url: "b".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    match container.get_component_by_type::<Database>() {
        Err(CoreError::Ambiguous { count, candidates, .. }) => {
            assert_eq!(count, 2);
            assert_eq!(candidates, vec!["primary".to_string(), "replica".to_string()]);
        }
        other => panic!("expected ambiguous error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_name_and_wrong_type_report_distinct_errors() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "x".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    assert!(matches!(
        container.get_component("nope"),
        Err(CoreError::NotFound(name)) if name == "nope"
    ));
    assert!(matches!(
        container.get_component_as::<Counter>("db"),
        Err(CoreError::TypeMismatch { name, .. }) if name == "db"
    ));
}

#[test]
fn eager_shared_components_are_built_during_refresh() {
    let built = Arc::new(AtomicUsize::new(0));
    let container = Container::new();

    let eager_built = built.clone();
    container
        .register(
            ComponentDescriptor::shared::<Counter>("eager")
                .construct_with(move || {
                    eager_built.fetch_add(1, Ordering::SeqCst);
                    Counter
                })
                .build()
                .unwrap(),
        )
        .unwrap();

    let lazy_built = built.clone();
    container
        .register(
            ComponentDescriptor::shared::<Counter>("lazy")
                .lazy()
                .construct_with(move || {
                    lazy_built.fetch_add(1, Ordering::SeqCst);
                    Counter
                })
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 0);
    container.refresh().unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);

    container.get_component("lazy").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);

    // Cached now; no further construction.
    container.get_component("eager").unwrap();
    container.get_component("lazy").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn create_component_bypasses_registry_and_cache() {
    let container = Container::new();
    container.refresh().unwrap();

    let descriptor = ComponentDescriptor::shared::<Database>("adhoc")
        .construct_with(|| Database { url: "adhoc".to_string() })
        .build()
        .unwrap();

    let first = container.create_component(&descriptor).unwrap();
    let second = container.create_component(&descriptor).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!container.has_component("adhoc"));
}

#[test]
fn introspection_reflects_registrations() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "x".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container
        .register(
            ComponentDescriptor::per_request::<Counter>("counter")
                .construct_with(|| Counter)
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(container.descriptor_count(), 2);
    assert_eq!(container.all_names(), vec!["db".to_string(), "counter".to_string()]);
    assert_eq!(container.type_of("db"), Some(TypeId::of::<Database>()));
    assert!(container.is_shared("db").unwrap());
    assert!(container.is_per_request("counter").unwrap());
    assert!(matches!(container.is_shared("nope"), Err(CoreError::NotFound(_))));
    assert_eq!(container.type_of("nope"), None);
}

#[test]
fn close_drops_cached_instances_but_keeps_descriptors() {
    let container = Container::new();
    container
        .register(
            ComponentDescriptor::shared::<Database>("db")
                .construct_with(|| Database { url: "x".to_string() })
                .build()
                .unwrap(),
        )
        .unwrap();
    container.refresh().unwrap();

    let before = container.get_component_as::<Database>("db").unwrap();
    container.close();
    assert!(container.has_component("db"));

    container.refresh().unwrap();
    let after = container.get_component_as::<Database>("db").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
}
