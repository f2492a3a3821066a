use bindery::{
    global, key_of, source_fn, Binding, Config, Inject, InjectionPlan, InstantiateErrorKind, Lifecycle, Plans,
    ResolveErrorKind,
};
use rand::Rng as _;
use serial_test::serial;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use tracing_test::traced_test;

const IDEPENDENCY: &str = "IDependency";
const IDEPENDENCY_WIRED_ONE: &str = "IDependencyWiredOne";
const IDEPENDENCY_WIRED_TWO: &str = "IDependencyWiredTwo";
const IDEPENDENCY_WIRED_SINGLETON: &str = "IDependencyWiredSingleton";
const IDEPENDENCY_CONTROLLER: &str = "IDependencyController";

#[derive(Default)]
struct Events {
    after_construction: bool,
    before_return: bool,
}

impl Events {
    fn after_construction(&mut self) {
        self.after_construction = true;
    }

    fn before_return(&mut self) -> Result<(), InstantiateErrorKind> {
        if !self.after_construction {
            return Err(InstantiateErrorKind::msg("after construction hook didn't run"));
        }
        self.before_return = true;
        Ok(())
    }

    fn all_ran(&self) -> bool {
        self.after_construction && self.before_return
    }
}

trait IDependencyWiredSingleton: Send + Sync {
    fn random(&self) -> i64;

    fn set_random(&self, random: i64);
}

#[derive(Default)]
struct DependencyWiredSingleton {
    random: AtomicI64,
}

impl IDependencyWiredSingleton for DependencyWiredSingleton {
    fn random(&self) -> i64 {
        self.random.load(Ordering::SeqCst)
    }

    fn set_random(&self, random: i64) {
        self.random.store(random, Ordering::SeqCst);
    }
}

struct MockWiredSingleton;

impl IDependencyWiredSingleton for MockWiredSingleton {
    fn random(&self) -> i64 {
        -999
    }

    fn set_random(&self, _random: i64) {}
}

struct DependencyWiredOne {
    singleton: Arc<dyn IDependencyWiredSingleton>,
    events: Events,
}

#[derive(Default)]
struct DependencyWiredTwo {
    singleton: Option<Arc<dyn IDependencyWiredSingleton>>,
    events: Events,
}

struct Dependency {
    wired_one: Option<Arc<DependencyWiredOne>>,
    wired_two: Arc<DependencyWiredTwo>,
    events: Events,
}

struct DependencyController {
    singleton: Arc<dyn IDependencyWiredSingleton>,
    events: Events,
}

struct DependencyProvides {
    random: i64,
}

struct DependencyProvidesSingleton {
    random: i64,
}

macro_rules! impl_lifecycle {
    ($($ty:ty),*) => {
        $(
            impl Lifecycle for $ty {
                fn after_construction(&mut self) -> Result<(), InstantiateErrorKind> {
                    self.events.after_construction();
                    Ok(())
                }

                fn before_return(&mut self) -> Result<(), InstantiateErrorKind> {
                    self.events.before_return()
                }
            }
        )*
    };
}

impl_lifecycle!(DependencyWiredOne, DependencyWiredTwo, Dependency, DependencyController);

fn random() -> i64 {
    rand::thread_rng().gen_range(9..99999)
}

fn plans() -> Plans {
    Plans::new()
        .provide(InjectionPlan::new(|| Ok(DependencyWiredSingleton::default())))
        .provide(
            InjectionPlan::new(|Inject(singleton): Inject<dyn IDependencyWiredSingleton>| {
                Ok(DependencyWiredOne {
                    singleton,
                    events: Events::default(),
                })
            })
            .param(0, IDEPENDENCY_WIRED_SINGLETON)
            .lifecycle(),
        )
        .provide(
            InjectionPlan::new(|| Ok(DependencyWiredTwo::default()))
                .field_keyed(
                    "singleton",
                    IDEPENDENCY_WIRED_SINGLETON,
                    |this: &mut DependencyWiredTwo, singleton: Arc<dyn IDependencyWiredSingleton>| {
                        this.singleton = Some(singleton);
                    },
                )
                .lifecycle(),
        )
        .provide(
            InjectionPlan::new(|Inject(wired_two): Inject<DependencyWiredTwo>| {
                Ok(Dependency {
                    wired_one: None,
                    wired_two,
                    events: Events::default(),
                })
            })
            .param(0, IDEPENDENCY_WIRED_TWO)
            .field_keyed("wired_one", IDEPENDENCY_WIRED_ONE, |this: &mut Dependency, wired_one: Arc<DependencyWiredOne>| {
                this.wired_one = Some(wired_one);
            })
            .lifecycle(),
        )
        .provide(
            InjectionPlan::new(|Inject(singleton): Inject<dyn IDependencyWiredSingleton>| {
                Ok(DependencyController {
                    singleton,
                    events: Events::default(),
                })
            })
            .param(0, IDEPENDENCY_WIRED_SINGLETON)
            .lifecycle(),
        )
}

fn binds() -> Vec<Binding> {
    vec![
        Binding::transient::<Dependency>(IDEPENDENCY),
        Binding::transient::<DependencyWiredOne>(IDEPENDENCY_WIRED_ONE),
        Binding::transient::<DependencyWiredTwo>(IDEPENDENCY_WIRED_TWO),
        Binding::singleton_as::<dyn IDependencyWiredSingleton, DependencyWiredSingleton, _>(
            IDEPENDENCY_WIRED_SINGLETON,
            |singleton: Arc<DependencyWiredSingleton>| singleton as Arc<dyn IDependencyWiredSingleton>,
        ),
        Binding::provides(key_of::<DependencyProvides>(), || Ok(DependencyProvides { random: random() })),
        Binding::provides_singleton(key_of::<DependencyProvidesSingleton>(), || {
            Ok(DependencyProvidesSingleton { random: random() })
        }),
    ]
}

fn wired_singleton() -> Result<Arc<dyn IDependencyWiredSingleton>, ResolveErrorKind> {
    global::get::<dyn IDependencyWiredSingleton>(IDEPENDENCY_WIRED_SINGLETON)
}

fn setup(config: Config) {
    global::reset();
    global::clear_settings();
    global::set_config(config);
    global::set_plans(plans());
    global::set_binds_source(binds());
    global::set_routes_source(source_fn(|| vec![Binding::route::<DependencyController>(IDEPENDENCY_CONTROLLER)]));
}

#[test]
#[serial]
#[traced_test]
fn test_no_bind() {
    setup(Config::default());

    assert!(matches!(
        global::get::<Dependency>("AnyClass"),
        Err(ResolveErrorKind::NoBinding { key }) if key == "AnyClass"
    ));
}

#[test]
#[serial]
#[traced_test]
fn test_singleton() {
    setup(Config::default());

    let singleton = wired_singleton().unwrap();
    let random = random();
    singleton.set_random(random);

    assert_eq!(wired_singleton().unwrap().random(), random);
}

#[test]
#[serial]
#[traced_test]
fn test_provides() {
    setup(Config::default());

    let provides_1 = global::resolve::<DependencyProvides>().unwrap();
    let provides_2 = global::resolve::<DependencyProvides>().unwrap();

    assert!((9..99999).contains(&provides_1.random));
    assert!(!Arc::ptr_eq(&provides_1, &provides_2));
}

#[test]
#[serial]
#[traced_test]
fn test_provides_singleton() {
    setup(Config::default());

    let provides = global::resolve::<DependencyProvidesSingleton>().unwrap();

    assert!((9..99999).contains(&provides.random));
    assert_eq!(global::resolve::<DependencyProvidesSingleton>().unwrap().random, provides.random);
}

#[test]
#[serial]
#[traced_test]
fn test_transient() {
    setup(Config::default());

    let dependency = global::get::<Dependency>(IDEPENDENCY).unwrap();
    assert!(dependency.events.all_ran());

    let wired_one = dependency.wired_one.as_ref().unwrap();
    let wired_two = &dependency.wired_two;
    assert!(wired_one.events.all_ran());
    assert!(wired_two.events.all_ran());

    let random = random();
    wired_one.singleton.set_random(random);
    assert_eq!(wired_two.singleton.as_ref().unwrap().random(), random);
}

#[test]
#[serial]
#[traced_test]
fn test_route_from_wrong_getter() {
    setup(Config::default());

    assert!(matches!(
        global::get::<DependencyController>(IDEPENDENCY_CONTROLLER),
        Err(ResolveErrorKind::WrongGetter { .. })
    ));
}

#[test]
#[serial]
#[traced_test]
fn test_route() {
    setup(Config::default());

    let controller = global::get_route::<DependencyController>(IDEPENDENCY_CONTROLLER).unwrap();
    assert!(controller.events.all_ran());
    assert!(Arc::ptr_eq(
        &controller.singleton,
        &wired_singleton().unwrap()
    ));
}

#[test]
#[serial]
#[traced_test]
fn test_bind_isnt_route() {
    setup(Config::default());

    assert!(matches!(
        global::get_route::<Dependency>(IDEPENDENCY),
        Err(ResolveErrorKind::NotARoute { .. })
    ));
}

#[test]
#[serial]
#[traced_test]
fn test_mock() {
    setup(Config::test());

    global::build(vec![Binding::mock_shared::<dyn IDependencyWiredSingleton>(
        IDEPENDENCY_WIRED_SINGLETON,
        Arc::new(MockWiredSingleton),
    )])
    .unwrap();

    let dependency = global::get::<Dependency>(IDEPENDENCY).unwrap();
    assert_eq!(dependency.wired_one.as_ref().unwrap().singleton.random(), -999);
    assert_eq!(dependency.wired_two.singleton.as_ref().unwrap().random(), -999);
}

#[test]
#[serial]
#[traced_test]
fn test_reset_drops_singletons() {
    setup(Config::default());

    let singleton_1 = wired_singleton().unwrap();
    global::reset();
    global::reset();
    let singleton_2 = wired_singleton().unwrap();

    assert!(!Arc::ptr_eq(&singleton_1, &singleton_2));
}

#[test]
#[serial]
#[traced_test]
fn test_build_without_bindings_keeps_container() {
    setup(Config::default());

    let singleton_1 = wired_singleton().unwrap();
    global::build(Vec::new()).unwrap();
    let singleton_2 = wired_singleton().unwrap();

    assert!(Arc::ptr_eq(&singleton_1, &singleton_2));
}

#[test]
#[serial]
#[traced_test]
fn test_failed_build_keeps_container() {
    setup(Config::default());

    let singleton_1 = wired_singleton().unwrap();
    assert!(global::build(vec![Binding::mock(IDEPENDENCY, 1u8)]).is_err());
    assert!(global::is_built());

    let singleton_2 = wired_singleton().unwrap();
    assert!(Arc::ptr_eq(&singleton_1, &singleton_2));
}

#[test]
#[serial]
#[traced_test]
fn test_duplicate_source_binding() {
    setup(Config::default());
    global::set_routes_source(source_fn(|| vec![Binding::route::<Dependency>(IDEPENDENCY)]));

    assert!(matches!(
        global::get::<Dependency>(IDEPENDENCY),
        Err(ResolveErrorKind::Build(_))
    ));
    assert!(!global::is_built());
}
