use std::{cell::RefCell, rc::Rc};

use floem_form::{
    ChangeEvent, FieldEntry, FieldPath, FieldProps, FieldSeed, FieldStore, Form, FormData, flatten,
    unflatten,
};
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn flatten_then_unflatten_restores_the_record() {
    let record = object(json!({
        "id": "WBGene00000001",
        "cgc-name": "abi-1",
        "species": { "latin-name": "Caenorhabditis elegans", "id": 6239 },
        "other-names": ["Y57G11C.24", "ABI1"],
        "biotype": { "id": { "ns": "so", "value": "SO:0001217" } },
    }));

    let flat = flatten(&record);
    let store = FieldStore::default();
    store
        .initialize(
            flat.iter()
                .map(|(path, value)| (path.clone(), FieldSeed::new(value.clone()))),
        )
        .unwrap();

    let fields = store.snapshot();
    assert_eq!(unflatten(flat.keys(), &fields), record);
}

#[test]
fn reset_restores_initial_values() {
    let form = Form::new(object(json!({
        "name": "abi-1",
        "status": "live",
        "species": { "id": 6239 },
        "why": "",
    })))
    .unwrap();

    form.store().update_field("name", json!("x"));
    form.store().update_field("species:id", json!(6238));
    form.store().update_field("why", json!("because"));
    form.store().update_field("name", json!("y"));
    assert!(form.is_dirty());

    form.reset().unwrap();

    assert!(!form.is_dirty());
    for (_, entry) in form.store().snapshot() {
        assert_eq!(entry.value, entry.initial_value);
    }
}

#[test]
fn single_edit_makes_dirty_and_revert_cleans_regardless_of_provenance() {
    let form = Form::new(object(json!({ "name": "abi-1", "why": "", "when": "" }))).unwrap();

    form.store().update_field("name", json!("abi-2"));
    form.store().update_field("why", json!("rename"));
    assert!(form.is_dirty());

    form.store().update_field("when", json!("2024-01-01"));
    form.store().update_field("name", json!("abi-1"));
    assert!(!form.is_dirty());
}

#[test]
fn provenance_edits_alone_are_isolated() {
    let form = Form::new(object(json!({ "name": "abi-1", "why": "", "who": "" }))).unwrap();

    form.store().update_field("why", json!("curation"));
    form.store().update_field("who", json!("WBPerson1"));

    assert!(!form.is_dirty());
    assert_eq!(form.modified_data(), None);
    assert_eq!(
        form.data().prov,
        object(json!({ "why": "curation", "who": "WBPerson1" }))
    );
}

#[test]
fn binders_only_observe_their_own_field() {
    let store = FieldStore::default();
    store
        .initialize([
            (FieldPath::from("a"), FieldSeed::new("a0")),
            (FieldPath::from("b"), FieldSeed::new("b0")),
        ])
        .unwrap();

    let seen_a = Rc::new(RefCell::new(Vec::new()));
    let seen_b = Rc::new(RefCell::new(Vec::new()));
    let a = store.bind("a", {
        let seen = seen_a.clone();
        move |props: FieldProps<'_>| seen.borrow_mut().push(props.value.clone())
    });
    let b = store.bind("b", {
        let seen = seen_b.clone();
        move |props: FieldProps<'_>| seen.borrow_mut().push(props.value.clone())
    });

    a.change_handle().on_change(ChangeEvent::new("a1"));

    assert_eq!(*seen_a.borrow(), vec![json!("a0"), json!("a1")]);
    assert_eq!(*seen_b.borrow(), vec![json!("b0")]);
    assert_eq!(b.render_count(), 1);
}

#[test]
fn gene_rename_scenario() {
    let form = Form::new(object(json!({ "name": "abi-1", "status": "live" }))).unwrap();
    assert_eq!(
        form.store().field("name"),
        FieldEntry {
            value: json!("abi-1"),
            initial_value: json!("abi-1"),
            ..FieldEntry::default()
        }
    );

    form.store().update_field("name", json!("abi-2"));

    assert_eq!(
        form.data(),
        FormData {
            data: object(json!({ "name": "abi-2", "status": "live" })),
            prov: Map::new(),
        }
    );
    assert_eq!(
        form.modified_data(),
        Some(FormData {
            data: object(json!({ "name": "abi-2" })),
            prov: Map::new(),
        })
    );
    assert!(form.is_dirty());

    form.reset().unwrap();
    assert!(!form.is_dirty());
    assert_eq!(form.data().data["name"], json!("abi-1"));
}

#[test]
fn nested_edit_submits_only_the_changed_leaf() {
    let form = Form::new(object(json!({ "address": { "city": "X", "zip": "1" } }))).unwrap();
    assert!(form.store().contains("address:city"));
    assert!(form.store().contains("address:zip"));

    form.store().update_field("address:zip", json!("2"));

    assert_eq!(
        form.modified_data(),
        Some(FormData {
            data: object(json!({ "address": { "zip": "2" } })),
            prov: Map::new(),
        })
    );
}

#[test]
fn save_button_follows_dirtiness() {
    let form = Form::new(object(json!({ "name": "abi-1" }))).unwrap();
    let enabled = Rc::new(RefCell::new(Vec::new()));
    let _save = form.track_dirty({
        let enabled = enabled.clone();
        move |dirty| enabled.borrow_mut().push(dirty)
    });
    let name = form.bind("name", |_: FieldProps<'_>| {});

    for text in ["abi-", "abi-2", "abi-22"] {
        name.change_handle().on_change(ChangeEvent::new(text));
    }
    form.reset().unwrap();

    assert_eq!(*enabled.borrow(), vec![false, true, false]);
    assert_eq!(name.view().value, json!("abi-1"));
}

#[test]
fn disabled_form_reaches_every_control() {
    let form = Form::new(object(json!({ "name": "abi-1", "status": "live" }))).unwrap();
    let name = form.bind("name", |_: FieldProps<'_>| {});
    let status = form.bind("status", |_: FieldProps<'_>| {});

    form.set_disabled(true);

    assert!(name.view().disabled);
    assert!(status.view().disabled);
}

#[test]
fn text_controls_echoing_scalars_leave_the_form_clean() {
    let form = Form::new(object(json!({ "count": 5, "flag": false, "rank": 0 }))).unwrap();
    let count = form.bind("count", |_: FieldProps<'_>| {});

    count.change_handle().on_change(ChangeEvent::new("5"));
    form.store().update_field("flag", json!(""));
    form.store().update_field("rank", json!(""));

    assert!(!form.is_dirty());
    assert_eq!(form.modified_data(), None);

    count.change_handle().on_change(ChangeEvent::new("6"));
    assert_eq!(
        form.modified_data().map(|modified| modified.data),
        Some(object(json!({ "count": "6" })))
    );
}
