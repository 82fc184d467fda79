//! Edit/read assembly behaviour over the public engine API.

use rstest::{fixture, rstest};

use trellis_config::{BadDataPolicy, ClientConfig, Datastore, TestOption};
use trellis_engine::{
    assemble_close_request, assemble_edit_request, assemble_read_request, Assembly, Capability,
    EditContent, EditOptions, EngineError, FillPolicy, PeerCapabilities, ReadFilter, ReadOptions,
    RequestPayload, RequestVerb, Resolution, ScriptedPrompt, TargetResolver, ValueFiller,
};
use trellis_schema::{LeafType, SchemaBuilder, SchemaRegistry, TemplateId};
use trellis_value::{EditOperation, InsertOrder, InsertSpec, ValueNode};

struct Fixture {
    schema: SchemaRegistry,
    x: TemplateId,
    top: TemplateId,
    entry: TemplateId,
    id: TemplateId,
    value: TemplateId,
    tag: TemplateId,
}

/// Root leaf `x`, keyed list under `top`, and a root leaf-list `tag`.
#[fixture]
fn fixture() -> Fixture {
    let mut builder = SchemaBuilder::new();
    let x = builder.leaf(None, "x", LeafType::Int32);
    let top = builder.container(None, "top");
    let entry = builder.list(top, "entry", &["id"]);
    let id = builder.leaf(entry, "id", LeafType::Uint32);
    let value = builder.leaf(entry, "value", LeafType::String);
    let tag = builder.leaf_list(None, "tag", LeafType::String);
    let schema = builder.build().expect("schema builds");
    Fixture {
        schema,
        x,
        top,
        entry,
        id,
        value,
        tag,
    }
}

fn done<T>(assembly: Result<Assembly<T>, EngineError>) -> T {
    assembly
        .expect("assembly succeeds")
        .into_done()
        .expect("assembly was not canceled")
}

#[rstest]
fn a_single_leaf_merge_is_tagged_and_wrapped(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::with_value(&fixture.schema, fixture.x, "5").expect("leaf");

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Merge),
    ));

    assert_eq!(body.verb(), RequestVerb::EditConfig);
    assert_eq!(body.target(), Some(Datastore::Running));
    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    assert_eq!(root.name(), "x");
    assert_eq!(root.value(), Some("5"));
    assert_eq!(root.edit_operation(), Some(EditOperation::Merge));
    assert!(root.insert_spec().is_none(), "no insert metadata");
    assert!(body.default_operation().is_none(), "merge is the default");
}

#[rstest]
fn insert_before_without_an_anchor_is_a_missing_parameter(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::with_value(&fixture.schema, fixture.tag, "red").expect("entry");

    let error = assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Create).with_insert(InsertSpec {
            order: InsertOrder::Before,
            anchor: None,
        }),
    )
    .expect_err("anchor is required");
    assert!(matches!(error, EngineError::MissingParameter { .. }));
}

#[rstest]
fn an_anchor_with_an_absolute_order_is_rejected(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::with_value(&fixture.schema, fixture.tag, "red").expect("entry");

    let error = assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Create).with_insert(InsertSpec {
            order: InsertOrder::First,
            anchor: Some("blue".into()),
        }),
    )
    .expect_err("anchor makes no sense for 'first'");
    assert!(matches!(error, EngineError::UnsupportedOperation { .. }));
}

#[rstest]
fn insert_metadata_lands_on_the_ordered_entry(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::with_value(&fixture.schema, fixture.tag, "red").expect("entry");

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Create).with_insert(InsertSpec {
            order: InsertOrder::After,
            anchor: Some("blue".into()),
        }),
    ));

    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    let spec = root.insert_spec().expect("insert metadata present");
    assert_eq!(spec.order, InsertOrder::After);
    assert_eq!(spec.anchor.as_deref(), Some("blue"));
}

#[rstest]
fn insert_on_a_single_instance_node_is_unsupported(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::with_value(&fixture.schema, fixture.x, "5").expect("leaf");

    let error = assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Merge).with_insert(InsertSpec {
            order: InsertOrder::First,
            anchor: None,
        }),
    )
    .expect_err("a plain leaf is not user-ordered");
    assert!(matches!(error, EngineError::UnsupportedOperation { .. }));
}

#[rstest]
fn list_entries_must_carry_their_keys(fixture: Fixture) {
    let config = ClientConfig::default();
    let mut item = ValueNode::from_template(&fixture.schema, fixture.entry);
    item.add_child(ValueNode::with_value(&fixture.schema, fixture.value, "v").expect("value"))
        .expect("add value");

    let error = assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(item),
        EditOptions::new(EditOperation::Create),
    )
    .expect_err("the id key is missing");
    assert!(matches!(error, EngineError::MissingParameter { ref node } if node == "id"));
}

#[rstest]
fn resolved_targets_splice_into_the_config_payload(fixture: Fixture) {
    let config = ClientConfig::default();
    let resolver = TargetResolver::new(&fixture.schema);
    let Resolution::Target(resolved) = resolver
        .resolve("/top/entry[id='7']", true)
        .expect("path resolves")
    else {
        panic!("expected a target");
    };

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Resolved(resolved),
        EditOptions::new(EditOperation::Delete),
    ));

    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    assert_eq!(root.name(), "top");
    let entry_node = root.child_at(0).expect("entry");
    assert_eq!(entry_node.edit_operation(), Some(EditOperation::Delete));
    assert_eq!(
        entry_node.find_child("id").and_then(ValueNode::value),
        Some("7")
    );
}

#[rstest]
fn a_choice_target_cannot_be_edited() {
    let mut builder = SchemaBuilder::new();
    let server = builder.container(None, "server");
    let transport = builder.choice(server, "transport");
    let tcp = builder.case(transport, "tcp");
    builder.leaf(tcp, "tcp-port", LeafType::Uint32);
    let schema = builder.build().expect("schema builds");

    let resolver = TargetResolver::new(&schema);
    let Resolution::Target(resolved) = resolver
        .resolve("/server/transport", true)
        .expect("path resolves")
    else {
        panic!("expected a target");
    };

    let config = ClientConfig::default();
    let error = assemble_edit_request(
        &schema,
        &config,
        None,
        EditContent::Resolved(resolved),
        EditOptions::new(EditOperation::Delete),
    )
    .expect_err("choices are not editable nodes");
    assert!(matches!(error, EngineError::UnsupportedOperation { .. }));
}

#[rstest]
fn a_top_level_container_delegates_tagging_to_its_children(fixture: Fixture) {
    let config = ClientConfig::default();
    let mut top_node = ValueNode::from_template(&fixture.schema, fixture.top);
    let mut item = ValueNode::from_template(&fixture.schema, fixture.entry);
    item.add_child(ValueNode::with_value(&fixture.schema, fixture.id, "1").expect("id"))
        .expect("add id");
    top_node.add_child(item).expect("add entry");

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(top_node),
        EditOptions::new(EditOperation::Replace),
    ));

    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    assert_eq!(root.edit_operation(), None, "the wrapper is structural only");
    let entry_node = root.child_at(0).expect("entry");
    assert_eq!(entry_node.edit_operation(), Some(EditOperation::Replace));
}

#[rstest]
fn non_default_session_policies_ride_along(fixture: Fixture) {
    let mut config = ClientConfig::default();
    config.set_test_option(TestOption::Set);
    config.set_default_target(Datastore::Candidate);
    let content = ValueNode::with_value(&fixture.schema, fixture.x, "5").expect("leaf");

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(content),
        EditOptions::new(EditOperation::Merge),
    ));

    assert_eq!(body.test_option(), Some(TestOption::Set));
    assert_eq!(body.target(), Some(Datastore::Candidate));
    assert!(body.error_option().is_none(), "stop-on-error is the default");
}

#[rstest]
fn do_fill_mode_completes_chain_keys_interactively(fixture: Fixture) {
    let config = ClientConfig::default();
    let content =
        ValueNode::with_value(&fixture.schema, fixture.value, "hello").expect("leaf");

    let mut prompt = ScriptedPrompt::of_text(["42"]);
    let mut filler = ValueFiller::new(&fixture.schema, &mut prompt, FillPolicy::write());
    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        Some(&mut filler),
        EditContent::Content(content),
        EditOptions::new(EditOperation::Merge),
    ));

    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    assert_eq!(root.name(), "top");
    let entry_node = root.child_at(0).expect("entry");
    assert_eq!(
        entry_node.find_child("id").and_then(ValueNode::value),
        Some("42")
    );
    assert_eq!(
        entry_node.find_child("value").and_then(ValueNode::value),
        Some("hello")
    );
}

#[rstest]
fn subtree_filters_are_tagged_and_tolerate_partial_keys(fixture: Fixture) {
    let config = ClientConfig::default();
    let content = ValueNode::from_template(&fixture.schema, fixture.value);

    let body = done(assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        None,
        ReadFilter::Content(content),
        ReadOptions::default(),
    ));

    assert_eq!(body.verb(), RequestVerb::Get);
    let RequestPayload::SubtreeFilter(root) = body.payload() else {
        panic!("expected subtree filter");
    };
    assert_eq!(root.name(), "top");
    let entry_node = root.child_at(0).expect("entry");
    assert!(entry_node.find_child("id").is_none(), "keys left absent");
    assert!(root.filter_type().is_some(), "filter root is tagged");
}

#[rstest]
fn a_named_source_switches_to_get_config(fixture: Fixture) {
    let config = ClientConfig::default();
    let body = done(assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        None,
        ReadFilter::All,
        ReadOptions::from_datastore(Datastore::Running),
    ));
    assert_eq!(body.verb(), RequestVerb::GetConfig);
    assert_eq!(body.source(), Some(Datastore::Running));
    assert!(matches!(body.payload(), RequestPayload::Empty));
}

#[rstest]
fn xpath_filters_need_the_capability(fixture: Fixture) {
    let mut config = ClientConfig::default();
    config.set_bad_data_policy(BadDataPolicy::Error);

    let error = assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        None,
        ReadFilter::Select("/top/entry".into()),
        ReadOptions::default(),
    )
    .expect_err("peer lacks xpath");
    assert!(matches!(error, EngineError::CapabilityUnsupported { .. }));

    let body = done(assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::advertising([Capability::XpathFilter]),
        None,
        ReadFilter::Select("/top/entry".into()),
        ReadOptions::default(),
    ));
    let RequestPayload::XpathFilter(select) = body.payload() else {
        panic!("expected xpath filter");
    };
    assert_eq!(select, "/top/entry");
}

#[rstest]
fn capability_gaps_respect_the_bad_data_policy(fixture: Fixture) {
    let mut config = ClientConfig::default();
    config.set_bad_data_policy(BadDataPolicy::Ignore);
    let body = done(assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        None,
        ReadFilter::Select("/top".into()),
        ReadOptions::default(),
    ));
    assert!(matches!(body.payload(), RequestPayload::XpathFilter(_)));

    // Ask-user consults the prompt; declining cancels the assembly.
    config.set_bad_data_policy(BadDataPolicy::AskUser);
    let mut prompt = ScriptedPrompt::of_text(["n"]);
    let assembly = assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        Some(&mut prompt),
        ReadFilter::Select("/top".into()),
        ReadOptions::default(),
    )
    .expect("asking is not an error");
    assert!(assembly.is_canceled());

    let mut prompt = ScriptedPrompt::of_text(["y"]);
    let assembly = assemble_read_request(
        &fixture.schema,
        &config,
        &PeerCapabilities::none(),
        Some(&mut prompt),
        ReadFilter::Select("/top".into()),
        ReadOptions::default(),
    )
    .expect("asking is not an error");
    assert!(!assembly.is_canceled());
}

#[rstest]
fn canonical_ordering_restores_schema_order(fixture: Fixture) {
    let config = ClientConfig::default();
    let mut item = ValueNode::from_template(&fixture.schema, fixture.entry);
    item.add_child(ValueNode::with_value(&fixture.schema, fixture.value, "v").expect("value"))
        .expect("add value");
    item.add_child(ValueNode::with_value(&fixture.schema, fixture.id, "1").expect("id"))
        .expect("add id");

    let body = done(assemble_edit_request(
        &fixture.schema,
        &config,
        None,
        EditContent::Content(item),
        EditOptions::new(EditOperation::Create).with_canonical_order(),
    ));

    let RequestPayload::Config(root) = body.payload() else {
        panic!("expected config payload");
    };
    let entry_node = root.child_at(0).expect("entry");
    assert_eq!(entry_node.child_at(0).map(ValueNode::name), Some("id"));
    assert_eq!(entry_node.child_at(1).map(ValueNode::name), Some("value"));
}

#[rstest]
fn close_session_requests_are_marked() {
    let body = assemble_close_request();
    assert_eq!(body.verb(), RequestVerb::CloseSession);
    assert!(body.is_close_session());
    assert!(matches!(body.payload(), RequestPayload::Empty));
}
