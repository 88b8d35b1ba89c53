use super::*;
use crate::testing::FormHarness;
use futures::channel::oneshot;
use futures::executor::block_on;
use futures_timer::Delay;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, FormModel)]
struct Address {
    city: String,
    zip: String,
}

#[derive(Clone, Debug, PartialEq, FormModel)]
struct Person {
    name: String,
    age: u32,
    #[form(nested)]
    address: Address,
}

fn person() -> Person {
    Person {
        name: String::new(),
        age: 0,
        address: Address::default(),
    }
}

fn required(value: &String) -> Option<&'static str> {
    value.is_empty().then_some("required")
}

#[derive(Debug)]
struct BackendDown;

impl Display for BackendDown {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("backend down")
    }
}

impl std::error::Error for BackendDown {}

/// Async validator whose results are handed in by the test, one per call.
#[derive(Clone, Default)]
struct ScriptedValidator {
    pending: Arc<Mutex<VecDeque<oneshot::Receiver<Option<ErrorMessage>>>>>,
}

impl ScriptedValidator {
    fn expect_call(&self) -> oneshot::Sender<Option<ErrorMessage>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().expect("scripted queue").push_back(rx);
        tx
    }

    fn validation(&self, trigger: Trigger) -> FieldValidation<String> {
        let pending = self.pending.clone();
        FieldValidation::new().validate_with_async(trigger, move |_: &String| {
            let rx = pending.lock().ok().and_then(|mut queue| queue.pop_front());
            async move {
                match rx {
                    Some(rx) => rx.await.ok().flatten(),
                    None => None,
                }
            }
        })
    }
}

#[test]
fn derived_fields_stringify_to_dotted_paths() {
    let fields = Person::fields();
    assert_eq!(fields.path(), "");
    assert_eq!(fields.name().path(), "name");
    assert_eq!(fields.address().path(), "address");
    assert_eq!(fields.address().city().path(), "address.city");
    assert_eq!(
        fields.address().city().path(),
        Person::fields().address().city().path()
    );
}

#[test]
fn nested_lenses_read_and_write_through_the_spine() {
    let mut model = person();
    model.address.zip = "0150".into();
    let city = Person::fields().address().city();

    city.set(&mut model, "Oslo".into());
    assert_eq!(city.get(&model), "Oslo");
    assert_eq!(model.address.zip, "0150");
    assert_eq!(Person::fields().address().get(&model).city, "Oslo");
}

#[test]
fn validation_tree_flattens_to_dotted_paths() {
    let fields = Person::fields();
    let validation = FormValidation::<Person>::new()
        .field(fields.name(), FieldValidation::new().on_blur(required))
        .field(
            fields.address(),
            FieldValidation::new().on_submit(|address: &Address| {
                (address.city.is_empty() && !address.zip.is_empty()).then_some("city missing")
            }),
        )
        .nested(
            fields.address(),
            FormValidation::<Address>::new().field(
                Address::fields().zip(),
                FieldValidation::new()
                    .on_change(|zip: &String| (zip.len() > 5).then_some("zip too long")),
            ),
        );

    let flat = validation.flatten();
    assert_eq!(
        flat.paths().map(FieldPath::as_str).collect::<Vec<_>>(),
        vec!["address", "address.zip", "name"]
    );

    let address = flat.get("address").expect("address validators");
    assert!(address.get(Trigger::OnSubmit).is_some());
    assert!(address.get(Trigger::OnChange).is_none());

    let mut model = person();
    model.address.zip = "1234567".into();
    let zip = flat.get("address.zip").expect("zip validators");
    assert!(matches!(
        evaluate(zip, &model),
        Outcome::Ready(Some(ref error)) if error == &ErrorMessage::from("zip too long")
    ));
    assert!(matches!(
        evaluate(address, &model),
        Outcome::Ready(Some(ref error)) if error == &ErrorMessage::from("city missing")
    ));
}

#[test]
fn blur_validation_reports_and_clears_required_error() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(required)),
    )
    .expect("mount form");
    harness.register(&fields.name());

    harness.change(fields.name(), String::new()).expect("change");
    assert!(!harness.has_errors().expect("errors"));

    harness.blur(fields.name()).expect("blur");
    assert_eq!(
        harness.errors().expect("errors").get("name"),
        Some(&ErrorMessage::from("required"))
    );

    harness.change(fields.name(), "Alice".into()).expect("change");
    let data = harness.data().expect("data");
    assert!(data.error("name").is_none());
    assert!(data.is_field_dirty("name"));
    assert!(data.is_dirty());

    harness.blur(fields.name()).expect("blur again");
    assert!(!harness.has_errors().expect("errors"));
}

#[test]
fn unchanged_value_without_new_error_produces_no_snapshot() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(required)),
    )
    .expect("mount form");

    harness.change(fields.name(), "Alice".into()).expect("change");
    assert_eq!(harness.change_count(), 1);
    let before = harness.data().expect("data");

    harness.change(fields.name(), "Alice".into()).expect("same value");
    harness.blur(fields.name()).expect("valid blur");
    assert_eq!(harness.change_count(), 1);
    assert_eq!(harness.data().expect("data"), before);

    harness.change(fields.name(), String::new()).expect("clear");
    harness.blur(fields.name()).expect("invalid blur");
    assert_eq!(harness.change_count(), 3);

    harness.blur(fields.name()).expect("same error again");
    assert_eq!(harness.change_count(), 3);
}

#[test]
fn sync_change_error_is_not_overwritten_by_async_blur_result() {
    let fields = Person::fields();
    for async_result in [Some(ErrorMessage::from("async")), None] {
        let harness = FormHarness::mount(
            person(),
            FormValidation::<Person>::new().field(
                fields.name(),
                FieldValidation::new()
                    .on_change(required)
                    .on_blur_async(move |_: &String| {
                        let result = async_result.clone();
                        async move { result }
                    }),
            ),
        )
        .expect("mount form");

        harness.change(fields.name(), String::new()).expect("change");
        let task = harness.form().blur(fields.name()).expect("blur");
        assert!(task.is_pending());
        block_on(task).expect("async blur");

        assert_eq!(
            harness.data().expect("data").error("name"),
            Some(&ErrorMessage::from("required"))
        );
    }
}

#[test]
fn stale_async_result_for_superseded_value_is_discarded() {
    let fields = Person::fields();
    let scripted = ScriptedValidator::default();
    let form = Form::new(initial_data(person()), FormOptions::default());
    form.set_validation(FormValidation::<Person>::new().field(
        fields.name(),
        scripted.validation(Trigger::OnChange),
    ))
    .expect("validation");

    let first_result = scripted.expect_call();
    let second_result = scripted.expect_call();
    let first = form.change(fields.name(), "Al".into()).expect("first change");
    let second = form.change(fields.name(), "Alice".into()).expect("second change");
    assert_eq!(form.data().expect("data").values().name, "Alice");

    first_result
        .send(Some("stale".into()))
        .expect("resolve first");
    block_on(first).expect("first settles");
    assert!(form.data().expect("data").error("name").is_none());

    second_result
        .send(Some("taken".into()))
        .expect("resolve second");
    block_on(second).expect("second settles");
    assert_eq!(
        form.data().expect("data").error("name"),
        Some(&ErrorMessage::from("taken"))
    );
}

#[test]
fn async_change_clears_previous_error_before_it_resolves() {
    let fields = Person::fields();
    let scripted = ScriptedValidator::default();
    let form = Form::new(initial_data(person()), FormOptions::default());
    form.set_validation(
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(required))
            .field(fields.name(), scripted.validation(Trigger::OnChange)),
    )
    .expect("validation");

    block_on(form.blur(fields.name()).expect("blur")).expect("sync blur");
    assert!(form.data().expect("data").has_errors());

    let result = scripted.expect_call();
    let task = form.change(fields.name(), "Alice".into()).expect("change");
    let optimistic = form.data().expect("data");
    assert_eq!(optimistic.values().name, "Alice");
    assert!(!optimistic.has_errors());

    result.send(None).expect("resolve");
    block_on(task).expect("settle");
    assert!(!form.data().expect("data").has_errors());
}

#[test]
fn async_blur_with_timer_applies_resolved_error() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new().field(
            fields.name(),
            FieldValidation::new().on_blur_async(|value: &String| {
                let value = value.clone();
                async move {
                    Delay::new(Duration::from_millis(5)).await;
                    (value == "taken")
                        .then(|| ErrorMessage::id("name.taken").with_value("name", &value))
                }
            }),
        ),
    )
    .expect("mount form");

    harness.change(fields.name(), "taken".into()).expect("change");
    harness.blur(fields.name()).expect("blur");
    assert_eq!(
        harness.data().expect("data").error("name"),
        Some(&ErrorMessage::id("name.taken").with_value("name", "taken"))
    );
}

#[test]
fn submit_with_validation_errors_never_calls_submit_callback() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new().field(
            fields.age(),
            FieldValidation::new().on_submit(|age: &u32| (*age < 18).then_some("too young")),
        ),
    )
    .expect("mount form");
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        harness
            .form()
            .on_submit(move |_: Person| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), Infallible>(()) }
            })
            .expect("submit callback");
    }

    harness.submit().expect("submit");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let failures = harness.take_failures();
    assert_eq!(failures.len(), 1);
    let (error, data) = &failures[0];
    assert!(is_validation_error(error));
    assert_eq!(error.to_string(), "validation failed");
    assert!(data.has_errors());
    assert!(!data.is_submitting());
    assert_eq!(data.error("age"), Some(&ErrorMessage::from("too young")));

    let current = harness.data().expect("data");
    assert!(current.has_errors());
    assert!(!current.is_submitting());
    assert!(harness.take_finished().is_empty());
}

#[test]
fn submit_waits_for_async_validators_before_deciding() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new().field(
            fields.name(),
            FieldValidation::new().on_submit_async(|name: &String| {
                let taken = name == "taken";
                async move { taken.then(|| ErrorMessage::from("taken")) }
            }),
        ),
    )
    .expect("mount form");

    harness.change(fields.name(), "taken".into()).expect("change");
    harness.submit().expect("submit");

    let failures = harness.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.is_validation_error());
    assert_eq!(
        harness.data().expect("data").error("name"),
        Some(&ErrorMessage::from("taken"))
    );
}

#[test]
fn rejected_submit_forwards_the_callback_error_unwrapped() {
    let fields = Person::fields();
    let harness = FormHarness::mount(person(), FormValidation::new()).expect("mount form");
    harness
        .form()
        .on_submit(|_: Person| async { Err::<(), _>(BackendDown) })
        .expect("submit callback");

    harness.change(fields.name(), "Alice".into()).expect("change");
    harness.submit().expect("submit");

    let mut failures = harness.take_failures();
    assert_eq!(failures.len(), 1);
    let (error, data) = failures.remove(0);
    assert!(!is_validation_error(&error));
    assert_eq!(error.to_string(), "backend down");
    let rejection = error.into_rejection().expect("callback error");
    assert!(rejection.downcast_ref::<BackendDown>().is_some());

    assert!(!data.is_submitting());
    assert!(data.is_field_dirty("name"));
    assert!(data.is_dirty());
    assert_eq!(data.values().name, "Alice");
    assert_eq!(harness.data().expect("data"), data);
}

#[test]
fn successful_submit_rebases_dirtiness_on_submitted_values() {
    let fields = Person::fields();
    let harness = FormHarness::mount(person(), FormValidation::new()).expect("mount form");
    let saw_submitting = Arc::new(AtomicBool::new(false));
    {
        let form = harness.form().clone();
        let saw_submitting = saw_submitting.clone();
        harness
            .form()
            .on_submit(move |values: Person| {
                let submitting = form.data().map(|data| data.is_submitting()).unwrap_or(false);
                saw_submitting.store(submitting, Ordering::SeqCst);
                async move {
                    assert_eq!(values.name, "Alice");
                    Ok::<(), Infallible>(())
                }
            })
            .expect("submit callback");
    }

    harness.change(fields.name(), "Alice".into()).expect("change");
    harness.submit().expect("submit");

    assert!(saw_submitting.load(Ordering::SeqCst));
    let finished = harness.take_finished();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].dirty().is_empty());
    assert!(!finished[0].is_dirty());
    assert!(!finished[0].is_submitting());
    assert_eq!(finished[0].values().name, "Alice");
    assert!(harness.take_failures().is_empty());

    harness.change(fields.name(), "Bob".into()).expect("change");
    assert!(harness.data().expect("data").is_dirty());
    harness.change(fields.name(), "Alice".into()).expect("change back");
    assert!(!harness.data().expect("data").is_dirty());
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let form = Form::new(initial_data(person()), FormOptions::default());
    let first = form.submit().expect("first submit");
    assert!(form.data().expect("data").is_submitting());
    assert!(matches!(form.submit(), Err(FormError::AlreadySubmitting)));

    block_on(first).expect("first completes");
    assert!(!form.data().expect("data").is_submitting());
}

#[test]
fn sync_validation_failure_is_applied_before_submit_returns() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new().field(
            fields.age(),
            FieldValidation::new().on_submit(|age: &u32| (*age < 18).then_some("too young")),
        ),
    )
    .expect("mount form");

    let task = harness.form().submit().expect("submit");
    assert!(!task.is_pending());
    drop(task);

    let data = harness.data().expect("data");
    assert!(data.has_errors());
    assert!(!data.is_submitting());
    assert_eq!(harness.take_failures().len(), 1);

    harness.change(fields.age(), 30).expect("fix age");
    harness.submit().expect("submit again");
    assert_eq!(harness.take_finished().len(), 1);
}

#[test]
fn dropped_submit_task_releases_the_submitting_flag() {
    let fields = Person::fields();
    let harness = FormHarness::mount(person(), FormValidation::new()).expect("mount form");
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        harness
            .form()
            .on_submit(move |_: Person| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), Infallible>(()) }
            })
            .expect("submit callback");
    }
    harness.change(fields.name(), "Alice".into()).expect("change");

    let task = harness.form().submit().expect("submit");
    assert!(task.is_pending());
    assert!(harness.data().expect("data").is_submitting());
    drop(task);

    let data = harness.data().expect("data");
    assert!(!data.is_submitting());
    assert!(data.is_field_dirty("name"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    harness.submit().expect("second submit is accepted");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.take_finished().len(), 1);
    assert!(!harness.data().expect("data").is_submitting());
}

#[test]
fn comparator_may_read_the_form_it_compares_for() {
    let fields = Person::fields();
    let session: Arc<OnceLock<Form<Person>>> = Arc::new(OnceLock::new());
    let reads = Arc::new(AtomicUsize::new(0));
    let options = {
        let session = session.clone();
        let reads = reads.clone();
        FormOptions::default().with_comparator(move |_, _| {
            if session.get().is_some_and(|form| form.data().is_ok()) {
                reads.fetch_add(1, Ordering::SeqCst);
            }
            None
        })
    };
    let form = Form::new(initial_data(person()), options);
    form.set_validation(
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(required))
            .field(
                fields.age(),
                FieldValidation::new().on_change_async(|_: &u32| async { None }),
            ),
    )
    .expect("validation");
    assert!(session.set(form.clone()).is_ok());

    block_on(form.change(fields.name(), "Alice".into()).expect("change")).expect("settle");
    block_on(form.change(fields.name(), String::new()).expect("clear")).expect("settle");
    block_on(form.blur(fields.name()).expect("blur")).expect("settle");
    block_on(form.change(fields.age(), 40).expect("async change")).expect("settle");

    let data = form.data().expect("data");
    assert_eq!(data.error("name"), Some(&ErrorMessage::from("required")));
    assert_eq!(data.values().age, 40);
    assert!(data.is_field_dirty("age"));
    assert!(reads.load(Ordering::SeqCst) > 0);
}

#[test]
fn version_change_resets_tracking_and_rebases() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new().field(
            fields.age(),
            FieldValidation::new().on_blur(|age: &u32| (*age > 150).then_some("too old")),
        ),
    )
    .expect("mount form");

    harness.change(fields.age(), 200).expect("change");
    harness.blur(fields.age()).expect("blur");
    assert!(harness.data().expect("data").has_errors());

    harness.form().set_version(1).expect("bump version");
    let data = harness.data().expect("data");
    assert!(data.errors().is_empty());
    assert!(data.dirty().is_empty());
    assert_eq!(data.values().age, 200);
    assert_eq!(harness.form().version().expect("version"), 1);

    let changes = harness.change_count();
    harness.form().set_version(1).expect("same version");
    assert_eq!(harness.change_count(), changes);

    harness.change(fields.age(), 0).expect("back to old value");
    assert!(harness.data().expect("data").is_field_dirty("age"));
}

#[test]
fn update_initial_data_moves_the_dirtiness_baseline() {
    let fields = Person::fields();
    let form = Form::new(initial_data(person()), FormOptions::default());
    form.update_initial_data(|values| Person {
        name: "Zed".into(),
        ..values.clone()
    })
    .expect("update baseline");

    block_on(form.change(fields.name(), "Zed".into()).expect("change")).expect("settle");
    let data = form.data().expect("data");
    assert_eq!(data.values().name, "Zed");
    assert!(!data.is_field_dirty("name"));
}

#[test]
fn unmounted_form_drops_in_flight_results_and_notifications() {
    let fields = Person::fields();
    let scripted = ScriptedValidator::default();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.name(), scripted.validation(Trigger::OnChange)),
    )
    .expect("mount form");

    let result = scripted.expect_call();
    let task = harness.form().change(fields.name(), "Alice".into()).expect("change");
    let changes = harness.change_count();
    harness.form().unmount();

    result.send(Some("taken".into())).expect("resolve");
    block_on(task).expect("settle");
    harness.change(fields.name(), "Bob".into()).expect("ignored change");

    let data = harness.data().expect("data");
    assert!(data.error("name").is_none());
    assert_eq!(data.values().name, "Alice");
    assert_eq!(harness.change_count(), changes);
    assert!(!harness.form().is_mounted());
}

#[test]
fn custom_comparator_decides_dirtiness_and_suppression() {
    let fields = Person::fields();
    let mut initial = person();
    initial.name = "alice".into();
    let options = FormOptions::default().with_comparator(|left, right| {
        let left = left.downcast_ref::<String>()?;
        let right = right.downcast_ref::<String>()?;
        Some(left.eq_ignore_ascii_case(right))
    });
    let harness =
        FormHarness::mount_with(initial_data(initial), FormValidation::new(), options)
            .expect("mount form");

    harness.change(fields.name(), "ALICE".into()).expect("same by comparator");
    assert_eq!(harness.change_count(), 0);
    assert_eq!(harness.data().expect("data").values().name, "alice");

    harness.change(fields.name(), "bob".into()).expect("different");
    assert!(harness.data().expect("data").is_field_dirty("name"));

    harness.change(fields.age(), 3).expect("non-string falls back to PartialEq");
    assert!(harness.data().expect("data").is_field_dirty("age"));
}

#[test]
fn required_reflects_validators_rejecting_the_default_value() {
    let fields = Person::fields();
    let form = Form::new(initial_data(person()), FormOptions::default());
    form.set_validation(
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(required))
            .field(
                fields.address().city(),
                FieldValidation::new()
                    .on_change(|city: &String| (city == "Atlantis").then_some("not a city")),
            ),
    )
    .expect("validation");

    assert!(form.field(fields.name()).required().expect("name required"));
    assert!(!form.field(fields.age()).required().expect("age required"));
    assert!(
        !form
            .field(fields.address().city())
            .required()
            .expect("city required")
    );
}

#[test]
fn clear_errors_removes_a_subtree_or_everything() {
    let fields = Person::fields();
    let rejecting = |_: &String| Some("bad");
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.name(), FieldValidation::new().on_blur(rejecting))
            .field(fields.address().city(), FieldValidation::new().on_blur(rejecting))
            .field(fields.address().zip(), FieldValidation::new().on_blur(rejecting)),
    )
    .expect("mount form");
    harness.blur(fields.name()).expect("blur name");
    harness.blur(fields.address().city()).expect("blur city");
    harness.blur(fields.address().zip()).expect("blur zip");
    assert_eq!(harness.data().expect("data").errors().len(), 3);

    harness
        .form()
        .clear_errors(&fields.address())
        .expect("clear address");
    let data = harness.data().expect("data");
    assert_eq!(
        data.errors().keys().map(FieldPath::as_str).collect::<Vec<_>>(),
        vec!["name"]
    );
    assert!(data.has_errors());

    let cleared = clear_errors(&data, &Person::fields());
    assert!(cleared.errors().is_empty());
    assert!(!cleared.has_errors());
}

#[test]
fn field_binding_exposes_live_field_state() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.address().city(), FieldValidation::new().on_change(required)),
    )
    .expect("mount form");
    let city = harness.register(&fields.address().city());

    assert_eq!(city.name(), "address.city");
    block_on(city.change(String::new()).expect("change")).expect("settle");
    assert_eq!(city.error().expect("error"), Some(ErrorMessage::from("required")));
    assert!(!city.dirty().expect("dirty"));

    block_on(city.change("Oslo".into()).expect("change")).expect("settle");
    assert_eq!(city.value().expect("value"), "Oslo");
    assert!(city.dirty().expect("dirty"));
    assert_eq!(city.error().expect("error"), None);
    block_on(city.blur().expect("blur")).expect("settle");
    assert!(harness.errors().expect("errors").is_empty());

    harness.unregister(&fields.address().city());
    block_on(city.change(String::new()).expect("change")).expect("settle");
    assert!(!harness.has_errors().expect("registered errors"));
    assert!(harness.data().expect("data").has_errors());
}

#[test]
fn validate_all_keeps_existing_errors_when_async_result_is_valid() {
    let fields = Person::fields();
    let validators = FormValidation::<Person>::new()
        .field(
            fields.name(),
            FieldValidation::new().on_submit_async(|_: &String| async { None }),
        )
        .field(fields.age(), FieldValidation::new().on_submit(|_: &u32| Some("bad age")))
        .flatten();

    let data = reducer::update_field(
        &initial_data(person()),
        &fields.name(),
        "Alice".into(),
        true,
        Some("server says no".into()),
    );
    let validated = block_on(validate_all(&data, &validators).resolve());

    assert_eq!(validated.error("name"), Some(&ErrorMessage::from("server says no")));
    assert_eq!(validated.error("age"), Some(&ErrorMessage::from("bad age")));
    assert!(validated.has_errors());
    assert!(validated.is_dirty());
}

#[test]
fn snapshot_errors_serialize_keyed_by_dotted_path() {
    let fields = Person::fields();
    let harness = FormHarness::mount(
        person(),
        FormValidation::<Person>::new()
            .field(fields.address().city(), FieldValidation::new().on_blur(required)),
    )
    .expect("mount form");
    harness.blur(fields.address().city()).expect("blur");

    let json = serde_json::to_value(harness.data().expect("data").errors()).expect("serialize");
    assert_eq!(json, serde_json::json!({ "address.city": "required" }));
}
