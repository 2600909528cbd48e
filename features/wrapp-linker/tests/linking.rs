use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::executor::block_on;
use wrapp_linker::{
    BindingSource, Component, DefaultError, Inject, LinkError, Linked, Linker, LinkerConfig,
    PostConstruct, Registration, Slot, TagError,
};

mod test_utils;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Default)]
struct B {
    int_val: Inject<i64>,
}
impl Component for B {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new(
            "int_val",
            r#"inject:"intVal,optional:7""#,
            &self.int_val,
        )]
    }
}
impl Greeter for B {
    fn greet(&self) -> String {
        format!("b{}", *self.int_val)
    }
}

#[derive(Default)]
struct A {
    int_val: Inject<i64>,
    str_val: Inject<String>,
    greeter: Inject<Arc<dyn Greeter>>,
    b: Inject<Arc<B>>,
}
impl Component for A {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::new("int_val", r#"inject:"intVal""#, &self.int_val),
            Slot::new("str_val", r#"json:"str" inject:"strVal""#, &self.str_val),
            Slot::new("greeter", r#"inject:"infVal""#, &self.greeter),
            Slot::new("b", r#"inject:"""#, &self.b),
        ]
    }
}

#[derive(Default)]
struct C {
    greeter: Inject<Arc<dyn Greeter>>,
    certain: Inject<Arc<dyn Greeter>>,
}
impl Component for C {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::new("greeter", r#"inject:"""#, &self.greeter),
            Slot::new("certain", r#"inject:"certain""#, &self.certain),
        ]
    }
}

#[derive(Default)]
struct Certain {
    certain: Inject<Arc<dyn Greeter>>,
}
impl Component for Certain {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("certain", r#"inject:"certain""#, &self.certain)]
    }
}

fn greeter(b: Arc<B>) -> Registration<B> {
    Registration::component(b).exposes::<dyn Greeter>(|b| b)
}

fn link(linker: Linker) -> Result<Linked, LinkError> {
    test_utils::init_tracing();
    block_on(linker.initialize_all_timeout(std::time::Duration::from_secs(5)))
}

fn same_instance<T: ?Sized, U: ?Sized>(left: &Arc<T>, right: &Arc<U>) -> bool {
    Arc::as_ptr(left) as *const () == Arc::as_ptr(right) as *const ()
}

#[test]
fn injects_values_shared_instances_and_capabilities() {
    let a = Arc::new(A::default());
    let b = Arc::new(B::default());

    let linker = Linker::new()
        .register("AA", Registration::component(a.clone()))
        .register("infVal", greeter(b.clone()))
        .register("", greeter(b.clone()))
        .register("intVal", Registration::value(Arc::new(123_i64)))
        .register("strVal", Registration::value(Arc::new("test".to_string())));
    let linked = link(linker).expect("linking must succeed");

    // `b` registered twice is still a single provider
    assert_eq!(linked.graph().len(), 4);
    assert_eq!(*a.int_val, 123);
    assert_eq!(*a.str_val, "test");
    assert!(same_instance(&*a.greeter, &b));
    assert!(same_instance(&*a.b, &b));
    assert_eq!(*b.int_val, 123);
    assert_eq!(a.greeter.greet(), "b123");
}

#[test]
fn registration_order_does_not_matter() {
    let a = Arc::new(A::default());
    let b = Arc::new(B::default());

    let linker = Linker::new()
        .register("strVal", Registration::value(Arc::new("test".to_string())))
        .register("infVal", greeter(b.clone()))
        .register("intVal", Registration::value(Arc::new(5_i64)))
        .register("AA", Registration::component(a.clone()));
    let linked = link(linker).expect("linking must succeed");

    assert!(same_instance(&*a.b, &b));
    let order: Vec<_> = linked
        .initialization_order()
        .into_iter()
        .filter_map(|id| id.name.clone())
        .collect();
    let position = |name: &str| order.iter().position(|n| n == name).expect("initialized");
    assert!(position("infVal") < position("AA"));
    assert!(position("intVal") < position("infVal"));
}

#[test]
fn graph_records_bindings() {
    let b = Arc::new(B::default());
    let linker = Linker::new()
        .register("AA", Registration::component(Arc::new(A::default())))
        .register("infVal", greeter(b))
        .register("intVal", Registration::value(Arc::new(1_i64)))
        .register("strVal", Registration::value(Arc::new("s".to_string())));
    let linked = link(linker).expect("linking must succeed");

    let graph = linked.graph();
    assert_eq!(graph.len(), 4);
    let ids: Vec<_> = graph.ids().cloned().collect();

    let providers: Vec<_> = graph
        .dependencies_of(&ids[0])
        .filter_map(|id| id.name.clone())
        .collect();
    assert_eq!(providers, ["intVal", "strVal", "infVal"]);
    assert_eq!(
        graph.slots_of(&ids[0]),
        [
            ("int_val", BindingSource::Provider(2)),
            ("str_val", BindingSource::Provider(3)),
            ("greeter", BindingSource::Provider(1)),
            ("b", BindingSource::Provider(1)),
        ]
    );
    assert_eq!(
        graph.slots_of(&ids[1]),
        [("int_val", BindingSource::Provider(2))]
    );
    assert!(graph.slots_of(&ids[2]).is_empty());
}

#[test]
fn optional_slot_takes_default() {
    let b = Arc::new(B::default());
    let linked = link(Linker::new().register("", greeter(b.clone()))).expect("linking must succeed");

    assert_eq!(*b.int_val, 7);
    let id = linked.graph().ids().next().expect("one registration");
    assert_eq!(
        linked.graph().slots_of(id),
        [("int_val", BindingSource::Default("7".to_string()))]
    );
}

#[test]
fn named_slot_ignores_incompatible_types() {
    let b = Arc::new(B::default());
    let linker = Linker::new()
        .register("intVal", Registration::value(Arc::new(99_i32)))
        .register("", Registration::component(b.clone()));
    link(linker).expect("linking must succeed");

    assert_eq!(*b.int_val, 7);
}

#[test]
fn unnamed_candidates_are_ambiguous() {
    let linker = Linker::new()
        .register("", Registration::component(Arc::new(C::default())))
        .register("intVal", Registration::value(Arc::new(33_i64)))
        .register("certain", greeter(Arc::new(B::default())))
        .register("", greeter(Arc::new(B::default())));

    match link(linker) {
        Err(LinkError::AmbiguousBinding {
            field, candidates, ..
        }) => {
            assert_eq!(field, "greeter");
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected an ambiguous binding, got {:?}", other.err()),
    }
}

#[test]
fn requested_name_resolves_otherwise_ambiguous_slot() {
    let certain = Arc::new(Certain::default());
    let named = Arc::new(B::default());

    let linker = Linker::new()
        .register("", Registration::component(certain.clone()))
        .register("certain", greeter(named.clone()))
        .register("", greeter(Arc::new(B::default())));
    link(linker).expect("linking must succeed");

    assert!(same_instance(&*certain.certain, &named));
}

#[test]
fn duplicate_names_are_ambiguous() {
    let linker = Linker::new()
        .register("", Registration::component(Arc::new(B::default())))
        .register("intVal", Registration::value(Arc::new(1_i64)))
        .register("intVal", Registration::value(Arc::new(2_i64)));

    let error = link(linker).expect_err("two providers share the name");
    assert!(matches!(
        error,
        LinkError::AmbiguousBinding { requested: Some(ref name), .. } if name == "intVal"
    ));
}

#[test]
fn required_slot_without_provider_is_missing() {
    let linker = Linker::new().register("AA", Registration::component(Arc::new(A::default())));

    let error = link(linker).expect_err("nothing provides intVal");
    match &error {
        LinkError::MissingDependency {
            component,
            field,
            requested,
            ..
        } => {
            assert_eq!(component.name.as_deref(), Some("AA"));
            assert_eq!(*field, "int_val");
            assert_eq!(requested.as_deref(), Some("intVal"));
        }
        other => panic!("expected a missing dependency, got {:?}", other),
    }
    assert!(error.to_string().contains("'AA'"));
}

#[test]
fn unnamed_slot_without_compatible_provider_is_missing() {
    let linker = Linker::new()
        .register("count", Registration::value(Arc::new(3_i32)))
        .register("label", Registration::value(Arc::new("x".to_string())))
        .register("", Registration::component(declared(r#"inject:"""#)));

    match link(linker) {
        Err(LinkError::MissingDependency {
            field,
            wanted,
            requested: None,
            ..
        }) => {
            assert_eq!(field, "value");
            assert_eq!(wanted.type_name, "i64");
        }
        other => panic!("expected a missing dependency, got {:?}", other.err()),
    }
}

#[test]
fn instance_registered_under_two_names_answers_to_both() {
    let first = Arc::new(Certain::default());
    let second = Arc::new(Certain::default());
    let b = Arc::new(B::default());

    let linker = Linker::new()
        .register("one", Registration::component(first.clone()))
        .register("certain", greeter(b.clone()))
        .register("", greeter(b.clone()))
        .register("other", greeter(b.clone()))
        .register("two", Registration::component(second.clone()))
        .register("dup", Registration::component(second.clone()));
    let linked = link(linker).expect("linking must succeed");

    assert!(same_instance(&*first.certain, &b));
    assert!(same_instance(&*second.certain, &b));
    assert_eq!(linked.graph().len(), 3);
    assert_eq!(linked.state_of("other"), linked.state_of("certain"));
    assert_eq!(linked.state_of("dup"), linked.state_of("two"));
}

#[derive(Default)]
struct Floats {
    float_val: Inject<f32>,
    float_ok_val: Inject<f32>,
}
impl Component for Floats {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::new(
                "float_val",
                r#"inject: "wrongDefault,optional:1..23""#,
                &self.float_val,
            ),
            Slot::new(
                "float_ok_val",
                r#"inject: "test,optional:1.23""#,
                &self.float_ok_val,
            ),
        ]
    }
}

#[test]
fn invalid_default_fails_even_with_valid_sibling() {
    let linker = Linker::new().register("", Registration::component(Arc::new(Floats::default())));

    match link(linker) {
        Err(LinkError::DefaultConversion {
            field,
            literal,
            source: DefaultError::Parse { .. },
            ..
        }) => {
            assert_eq!(field, "float_val");
            assert_eq!(literal, "1..23");
        }
        other => panic!("expected a default conversion error, got {:?}", other.err()),
    }
}

#[test]
fn provider_wins_over_invalid_default() {
    let floats = Arc::new(Floats::default());
    let linker = Linker::new()
        .register("wrongDefault", Registration::value(Arc::new(1.22_f32)))
        .register("", Registration::component(floats.clone()));
    link(linker).expect("linking must succeed");

    assert_eq!(*floats.float_val, 1.22);
    assert_eq!(*floats.float_ok_val, 1.23);
}

#[derive(Default)]
struct Strings {
    string_val: Inject<String>,
    unset: Inject<Arc<B>>,
}
impl Component for Strings {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::new("string_val", r#"inject:"some,optional:abc""#, &self.string_val),
            Slot::new("unset", r#"inject:",optional""#, &self.unset),
        ]
    }
}

#[test]
fn optional_slots_without_provider() {
    let strings = Arc::new(Strings::default());
    link(Linker::new().register("", Registration::component(strings.clone())))
        .expect("linking must succeed");

    assert_eq!(*strings.string_val, "abc");
    assert!(!strings.unset.is_bound());
    assert!(strings.unset.get().is_none());
}

#[derive(Default)]
struct BadDefault {
    shared: Inject<Arc<B>>,
}
impl Component for BadDefault {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("shared", r#"inject:",optional:b""#, &self.shared)]
    }
}

#[test]
fn shared_slots_reject_defaults() {
    let linker = Linker::new().register("", Registration::component(Arc::new(BadDefault::default())));

    let error = link(linker).expect_err("shared slots have no literal form");
    assert!(matches!(
        error,
        LinkError::DefaultConversion {
            source: DefaultError::Unsupported { .. },
            ..
        }
    ));
}

struct Declared {
    tag: &'static str,
    value: Inject<i64>,
}
impl Component for Declared {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("value", self.tag, &self.value)]
    }
}

fn declared(tag: &'static str) -> Arc<Declared> {
    Arc::new(Declared {
        tag,
        value: Inject::new(),
    })
}

#[test]
fn malformed_declarations_are_reported() {
    let cases = [
        (r#"inject:"v,required""#, TagError::InvalidModifier("required".to_string())),
        (r#"json:"v""#, TagError::NotFound("inject".to_string())),
    ];

    for (tag, expected) in cases {
        let linker = Linker::new()
            .register("v", Registration::value(Arc::new(1_i64)))
            .register("", Registration::component(declared(tag)));

        match link(linker) {
            Err(LinkError::SlotDeclaration { field, source, .. }) => {
                assert_eq!(field, "value");
                assert_eq!(source, expected);
            }
            other => panic!("expected a slot declaration error, got {:?}", other.err()),
        }
    }
    assert!(matches!(
        link(Linker::new().register("", Registration::component(declared("inject:v")))),
        Err(LinkError::SlotDeclaration {
            source: TagError::Malformed { .. },
            ..
        })
    ));
}

#[test]
fn custom_tag_key() {
    let component = declared(r#"inject:"other" wire:"v""#);
    let linker = Linker::with_config(LinkerConfig::default().tag_key("wire"))
        .register("v", Registration::value(Arc::new(5_i64)))
        .register("other", Registration::value(Arc::new(6_i64)))
        .register("", Registration::component(component.clone()));
    link(linker).expect("linking must succeed");

    assert_eq!(*component.value, 5);
}

struct SelfReferred {
    me: Inject<Arc<SelfReferred>>,
    post_constructed: Arc<AtomicBool>,
}
impl Component for SelfReferred {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("me", r#"inject:"""#, &self.me)]
    }

    fn as_post_construct(&self) -> Option<&dyn PostConstruct> {
        Some(self)
    }
}
impl PostConstruct for SelfReferred {
    fn post_construct(&self) {
        self.post_constructed.store(true, Ordering::SeqCst);
    }
}

#[test]
fn self_reference_is_a_cycle() {
    let post_constructed = Arc::new(AtomicBool::new(false));
    let component = Arc::new(SelfReferred {
        me: Inject::new(),
        post_constructed: post_constructed.clone(),
    });

    let error = link(Linker::new().register("", Registration::component(component.clone())))
        .expect_err("a component depending on itself is a cycle");

    assert!(matches!(error, LinkError::DependencyCycle(_)));
    assert!(error.to_string().starts_with("Found a loop in the object graph dependencies"));
    assert!(!post_constructed.load(Ordering::SeqCst));
    assert!(!component.me.is_bound());
}

#[derive(Default)]
struct Looper1 {
    next: Inject<Arc<Looper2>>,
}
#[derive(Default)]
struct Looper2 {
    next: Inject<Arc<Looper3>>,
}
#[derive(Default)]
struct Looper3 {
    next: Inject<Arc<Looper1>>,
}
impl Component for Looper1 {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("next", r#"inject:"""#, &self.next)]
    }
}
impl Component for Looper2 {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("next", r#"inject:"""#, &self.next)]
    }
}
impl Component for Looper3 {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::new("next", r#"inject:"""#, &self.next)]
    }
}

#[test]
fn loops_are_detected_in_any_registration_order() {
    let registrations: [fn(Linker) -> Linker; 3] = [
        |linker| linker.register("", Registration::component(Arc::new(Looper1::default()))),
        |linker| linker.register("", Registration::component(Arc::new(Looper2::default()))),
        |linker| linker.register("", Registration::component(Arc::new(Looper3::default()))),
    ];

    for order in [[0, 1, 2], [1, 2, 0], [2, 1, 0]] {
        let linker = order
            .iter()
            .fold(Linker::new(), |linker, &index| registrations[index](linker));

        match link(linker) {
            Err(LinkError::DependencyCycle(cycle)) => {
                let wrapp_linker::DependencyGraphError::CircularDependency { chain, .. } = cycle;
                assert_eq!(chain.len(), 4, "three participants plus the closing one");
            }
            other => panic!("expected a dependency cycle, got {:?}", other.err()),
        }
    }
}
