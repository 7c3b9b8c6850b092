use ostore_filter::{
    FOLDER_CONTENT_NAME, FilterError, ItemLocator, ObjectType, RelationshipCategory,
    RelationshipFilter, RelationshipKind, RelationshipRecord,
};
use ostore_xml::XmlElement;

fn record(id: u64, name: &str, category: RelationshipCategory) -> RelationshipRecord {
    RelationshipRecord::new(
        id,
        name,
        category,
        RelationshipKind::User,
        ItemLocator::with_revision(100, 3),
        ItemLocator::new(200),
    )
}

#[test]
fn empty_filter_accepts_any_visible_record() {
    let filter = RelationshipFilter::new();
    assert!(filter.accepts(&record(1, "Attachment", RelationshipCategory::ActiveAssembly)));
}

#[test]
fn community_filtering_is_on_by_default() {
    let filter = RelationshipFilter::new();
    let mut hidden = record(1, "Attachment", RelationshipCategory::ActiveAssembly);
    hidden.visible_to_community = false;
    assert!(!filter.accepts(&hidden));

    let mut open = RelationshipFilter::new();
    open.set_community_filtering(false);
    assert!(open.accepts(&hidden));
}

#[test]
fn category_names_and_kind_form_an_or_group() {
    let mut filter = RelationshipFilter::new();
    filter.set_category(RelationshipCategory::Translation);
    filter.add_name("Attachment").expect("valid name");

    // Matches on the name even though the category differs.
    assert!(filter.accepts(&record(1, "Attachment", RelationshipCategory::ActiveAssembly)));
    // Matches on the category even though the name differs.
    assert!(filter.accepts(&record(2, "FrenchCopy", RelationshipCategory::Translation)));
    // Matches neither.
    assert!(!filter.accepts(&record(3, "Sidebar", RelationshipCategory::Widget)));
}

#[test]
fn criteria_outside_the_group_are_conjunctive() {
    let mut filter = RelationshipFilter::new();
    filter.add_name("Attachment").expect("valid name");
    filter.set_owner(ItemLocator::new(100));

    assert!(filter.accepts(&record(1, "Attachment", RelationshipCategory::ActiveAssembly)));

    let mut elsewhere = record(2, "Attachment", RelationshipCategory::ActiveAssembly);
    elsewhere.owner = ItemLocator::new(999);
    assert!(!filter.accepts(&elsewhere));
}

#[test]
fn names_match_case_insensitively() {
    let mut filter = RelationshipFilter::new();
    filter.add_name("attachment").expect("valid name");
    assert!(filter.accepts(&record(1, "ATTACHMENT", RelationshipCategory::ActiveAssembly)));
}

#[test]
fn names_are_stripped_of_whitespace() {
    let mut filter = RelationshipFilter::new();
    filter.add_name("  Home\tPage \n").expect("valid name");
    assert!(filter.names().contains("HomePage"));

    let err = filter.add_name(" \t ").expect_err("all-whitespace name");
    assert!(matches!(err, FilterError::InvalidArgument { field, .. } if field == "name"));
}

#[test]
fn folder_category_pins_the_name_filter() {
    let mut filter = RelationshipFilter::new();
    filter.add_name("Attachment").expect("valid name");
    filter.set_category(RelationshipCategory::Folder);

    assert_eq!(filter.names().len(), 1);
    assert!(filter.names().contains(FOLDER_CONTENT_NAME));
}

#[test]
fn content_type_id_sides_are_mutually_exclusive() {
    let mut filter = RelationshipFilter::new();
    filter.set_owner_content_type_id(7).expect("first side is free");
    let err = filter
        .set_dependent_content_type_id(8)
        .expect_err("other side must conflict");
    assert!(matches!(
        err,
        FilterError::ConflictingCriteria { field, conflicts_with }
            if field == "dependentContentTypeId" && conflicts_with == "ownerContentTypeId"
    ));
}

#[test]
fn object_type_sides_are_mutually_exclusive() {
    let mut filter = RelationshipFilter::new();
    filter
        .set_dependent_object_type(ObjectType::Folder)
        .expect("first side is free");
    assert!(filter.set_owner_object_type(ObjectType::Item).is_err());
}

#[test]
fn dependent_criteria_conflict_with_owner_revision_limits() {
    let mut filter = RelationshipFilter::new();
    filter
        .limit_to_edit_or_current_owner_revision(true)
        .expect("no dependent criteria yet");
    assert!(filter.set_dependent_content_type_id(8).is_err());
    assert!(filter.set_dependent_object_type(ObjectType::Item).is_err());

    let mut reversed = RelationshipFilter::new();
    reversed.set_dependent_content_type_id(8).expect("free");
    assert!(reversed.limit_to_edit_or_current_owner_revision(true).is_err());
    assert!(reversed.limit_to_tip_revision(true).is_err());
}

#[test]
fn revision_limits_supersede_each_other() {
    let mut filter = RelationshipFilter::new();
    filter.limit_to_owner_revision(true);
    filter.limit_to_tip_revision(true).expect("no conflicts");
    assert!(!filter.is_limited_to_owner_revision());
    assert!(filter.is_limited_to_tip_revision());

    filter.limit_to_public_revision(true);
    assert!(!filter.is_limited_to_tip_revision());
    assert!(filter.is_limited_to_public_revision());
}

#[test]
fn owner_revision_limit_compares_revisions() {
    let mut filter = RelationshipFilter::new();
    filter.set_owner(ItemLocator::with_revision(100, 3));
    filter.limit_to_owner_revision(true);
    assert!(filter.accepts(&record(1, "Attachment", RelationshipCategory::ActiveAssembly)));

    let mut other_revision = record(2, "Attachment", RelationshipCategory::ActiveAssembly);
    other_revision.owner = ItemLocator::with_revision(100, 4);
    assert!(!filter.accepts(&other_revision));

    // Without the limit the revision is ignored.
    filter.limit_to_owner_revision(false);
    assert!(filter.accepts(&other_revision));
}

#[test]
fn tip_and_public_limits_check_record_flags() {
    let mut filter = RelationshipFilter::new();
    filter.limit_to_tip_revision(true).expect("no conflicts");
    let mut stale = record(1, "Attachment", RelationshipCategory::ActiveAssembly);
    stale.owner_is_tip_revision = false;
    assert!(!filter.accepts(&stale));

    filter.limit_to_public_revision(true);
    let mut unpublished = record(2, "Attachment", RelationshipCategory::ActiveAssembly);
    unpublished.owner_is_public_revision = false;
    assert!(!filter.accepts(&unpublished));
}

#[test]
fn dependents_match_any_locator() {
    let mut filter = RelationshipFilter::new();
    filter.add_dependent(ItemLocator::new(200));
    filter.add_dependent(ItemLocator::new(300));

    assert!(filter.accepts(&record(1, "Attachment", RelationshipCategory::ActiveAssembly)));

    let mut unrelated = record(2, "Attachment", RelationshipCategory::ActiveAssembly);
    unrelated.dependent = ItemLocator::new(999);
    assert!(!filter.accepts(&unrelated));
}

#[test]
fn property_criteria_must_all_match() {
    let mut filter = RelationshipFilter::new();
    filter.set_property("slot", "header");
    filter.set_property("locale", "en");

    let mut matching = record(1, "Widget", RelationshipCategory::Widget);
    matching.properties.insert("slot".to_string(), "header".to_string());
    matching.properties.insert("locale".to_string(), "en".to_string());
    matching.properties.insert("extra".to_string(), "ignored".to_string());
    assert!(filter.accepts(&matching));

    let mut partial = record(2, "Widget", RelationshipCategory::Widget);
    partial.properties.insert("slot".to_string(), "header".to_string());
    assert!(!filter.accepts(&partial));
}

#[test]
fn pure_properties_predicate_is_recomputed() {
    let mut filter = RelationshipFilter::new();
    assert!(!filter.is_pure_properties_filter());

    filter.set_property("slot", "header");
    assert!(filter.is_pure_properties_filter());

    filter.set_owner(ItemLocator::new(100));
    assert!(!filter.is_pure_properties_filter());

    filter.reset();
    filter.set_property("slot", "header");
    filter.set_community_filtering(false);
    assert!(!filter.is_pure_properties_filter());
}

#[test]
fn reset_restores_all_defaults() {
    let mut filter = RelationshipFilter::new();
    filter.set_relationship_id(42);
    filter.set_category(RelationshipCategory::Folder);
    filter.set_owner(ItemLocator::new(100));
    filter.set_property("slot", "header");
    filter.set_community_filtering(false);
    filter.limit_to_owner_revision(true);

    filter.reset();
    assert_eq!(filter, RelationshipFilter::new());
    assert!(filter.is_community_filtering());
}

#[test]
fn cloned_filter_is_independent() {
    let mut original = RelationshipFilter::new();
    original.add_name("Attachment").expect("valid name");
    original.set_property("slot", "header");

    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.add_name("Sidebar").expect("valid name");
    assert_eq!(original.names().len(), 1);
}

#[test]
fn filter_round_trips_through_xml() {
    let mut filter = RelationshipFilter::new();
    filter.set_relationship_id(42);
    filter.set_kind(RelationshipKind::User);
    filter.add_name("Attachment").expect("valid name");
    filter.add_name("Sidebar").expect("valid name");
    filter.set_owner(ItemLocator::with_revision(100, 3));
    filter.add_dependent(ItemLocator::new(200));
    filter.add_dependent(ItemLocator::new(300));
    filter.set_owner_content_type_id(7).expect("free side");
    filter.set_owner_object_type(ObjectType::Folder).expect("free side");
    filter.set_property("slot", "header");
    filter.limit_to_public_revision(true);
    filter.set_community_filtering(false);

    let xml = filter.to_xml().to_xml_string().expect("serializes");
    let parsed = XmlElement::parse(&xml).expect("parses back");
    let restored = RelationshipFilter::from_xml(&parsed).expect("rebuilds");
    assert_eq!(restored, filter);
}

#[test]
fn minimal_filter_round_trips_through_xml() {
    let filter = RelationshipFilter::new();
    let xml = filter.to_xml().to_xml_string().expect("serializes");
    let parsed = XmlElement::parse(&xml).expect("parses back");
    let restored = RelationshipFilter::from_xml(&parsed).expect("rebuilds");
    assert_eq!(restored, filter);
}

#[test]
fn conflicting_document_is_rejected() {
    let element = XmlElement::new("RelationshipFilter")
        .with_attribute("ownerContentTypeId", "7")
        .with_attribute("dependentContentTypeId", "8");
    let err = RelationshipFilter::from_xml(&element).expect_err("conflict must surface");
    assert!(matches!(err, FilterError::ConflictingCriteria { .. }));
}

#[test]
fn wrong_root_element_is_rejected() {
    let element = XmlElement::new("SomethingElse");
    assert!(RelationshipFilter::from_xml(&element).is_err());
}

#[test]
fn filter_survives_json_round_trip() {
    let mut filter = RelationshipFilter::new();
    filter.set_category(RelationshipCategory::Widget);
    filter.set_property("slot", "header");

    let json = serde_json::to_string(&filter).expect("serializes");
    let restored: RelationshipFilter = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(restored, filter);
}
