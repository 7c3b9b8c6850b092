//! Fixture entities used across the integration tests: a content item
//! owning an ordered property list and an unordered label set.

#![allow(dead_code)]

use ostore_model::collection::ComponentList;
use ostore_model::component::{Component, KeyGenerator, StateTracker};
use ostore_model::delta;
use ostore_model::error::{Result, StoreError};
use ostore_model::key::Key;
use ostore_model::set::ComponentSet;
use ostore_model::state::{ComponentState, DeltaAction};
use ostore_xml::XmlElement;

pub const ITEM_ID: &str = "ITEMID";
pub const PROPERTY_ID: &str = "PROPERTYID";
pub const LABEL_ID: &str = "LABELID";

/// Leaf component: one named property of a content item.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    tracker: StateTracker,
    name: String,
    value: String,
    /// Transient UI-only hint; excluded from equality and serialization.
    ui_hint: Option<String>,
}

impl PropertyEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tracker: StateTracker::new("PropertyEntry", Key::new([ITEM_ID, PROPERTY_ID])),
            name: name.into(),
            value: value.into(),
            ui_hint: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.tracker.touch(&mut self.value, value)
    }

    pub fn set_ui_hint(&mut self, hint: impl Into<String>) {
        // Transient: never dirties the component.
        self.ui_hint = Some(hint.into());
    }

    pub fn ui_hint(&self) -> Option<&str> {
        self.ui_hint.as_deref()
    }
}

impl PartialEq for PropertyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.tracker == other.tracker && self.name == other.name && self.value == other.value
    }
}

impl Component for PropertyEntry {
    fn node_name() -> &'static str {
        "PropertyEntry"
    }

    fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut StateTracker {
        &mut self.tracker
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new(Self::node_name())
            .with_attribute("name", self.name.clone())
            .with_attribute("value", self.value.clone());
        self.tracker.key().write_attributes(&mut element);
        element
    }

    fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name(Self::node_name())?;
        let name = element.require_attribute("name")?.to_string();
        let value = element.require_attribute("value")?.to_string();
        let mut key = Key::new([ITEM_ID, PROPERTY_ID]);
        key.read_attributes(element);
        Ok(Self {
            tracker: StateTracker::restored("PropertyEntry", key),
            name,
            value,
            ui_hint: None,
        })
    }
}

/// Leaf component: a label attached to a content item. The component-type
/// string is configurable so member-type enforcement can be exercised.
#[derive(Debug, Clone)]
pub struct LabelEntry {
    tracker: StateTracker,
    text: String,
}

impl LabelEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_type("LabelEntry", text)
    }

    pub fn with_type(component_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tracker: StateTracker::new(component_type, Key::new([ITEM_ID, LABEL_ID])),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.tracker.touch(&mut self.text, text)
    }
}

impl PartialEq for LabelEntry {
    fn eq(&self, other: &Self) -> bool {
        self.tracker == other.tracker && self.text == other.text
    }
}

impl Component for LabelEntry {
    fn node_name() -> &'static str {
        "LabelEntry"
    }

    fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut StateTracker {
        &mut self.tracker
    }

    fn to_xml(&self) -> XmlElement {
        let mut element =
            XmlElement::new(Self::node_name()).with_attribute("text", self.text.clone());
        self.tracker.key().write_attributes(&mut element);
        element
    }

    fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name(Self::node_name())?;
        let text = element.require_attribute("text")?.to_string();
        let mut key = Key::new([ITEM_ID, LABEL_ID]);
        key.read_attributes(element);
        Ok(Self {
            tracker: StateTracker::restored("LabelEntry", key),
            text,
        })
    }
}

/// Composite component: scalar fields plus an ordered property list and an
/// unordered label set.
#[derive(Debug, Clone)]
pub struct ContentItem {
    tracker: StateTracker,
    title: String,
    body: String,
    pub properties: ComponentList<PropertyEntry>,
    pub labels: ComponentSet<LabelEntry>,
}

impl ContentItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            tracker: StateTracker::new("ContentItem", Key::new([ITEM_ID])),
            title: title.into(),
            body: String::new(),
            properties: ComponentList::new(),
            labels: ComponentSet::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.tracker.touch(&mut self.title, title)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> bool {
        let body = body.into();
        self.tracker.touch(&mut self.body, body)
    }

    /// Scalar fields and key only; collections are serialized separately
    /// so delta emission can order them around this element.
    fn scalar_xml(&self) -> XmlElement {
        let mut element =
            XmlElement::new(Self::node_name()).with_attribute("title", self.title.clone());
        self.tracker.key().write_attributes(&mut element);
        if !self.body.is_empty() {
            element.add_child(XmlElement::new("Body").with_text(self.body.clone()));
        }
        element
    }
}

impl PartialEq for ContentItem {
    fn eq(&self, other: &Self) -> bool {
        self.tracker == other.tracker
            && self.title == other.title
            && self.body == other.body
            && self.properties == other.properties
            && self.labels == other.labels
    }
}

impl Component for ContentItem {
    fn node_name() -> &'static str {
        "ContentItem"
    }

    fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut StateTracker {
        &mut self.tracker
    }

    fn child_state(&self) -> ComponentState {
        self.properties.state().merged(self.labels.state())
    }

    fn mark_for_deletion(&mut self) {
        self.tracker.mark_for_deletion();
        self.properties.mark_for_deletion();
        self.labels.mark_for_deletion();
    }

    fn set_persisted(&mut self) -> Result<()> {
        // Check collection states up front so a marked collection fails
        // the persist before the tracker is reset.
        if self.properties.state() == ComponentState::MarkedForDelete
            || self.labels.state() == ComponentState::MarkedForDelete
        {
            return Err(StoreError::InvalidPersistTransition {
                component_type: self.component_type().to_string(),
            });
        }
        self.tracker.set_persisted()?;
        self.properties.set_persisted()?;
        self.labels.set_persisted()?;
        Ok(())
    }

    fn reset_to_new(&mut self) {
        self.tracker.mark_new();
        self.properties.reset_to_new();
        self.labels.reset_to_new();
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = self.scalar_xml();
        element.add_child(self.properties.to_xml());
        element.add_child(self.labels.to_xml());
        element
    }

    fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name(Self::node_name())?;
        let title = element.require_attribute("title")?.to_string();
        let body = element.child_text("Body").unwrap_or("").to_string();
        let mut key = Key::new([ITEM_ID]);
        key.read_attributes(element);
        let properties = ComponentList::from_xml(
            element.require_child(&ComponentList::<PropertyEntry>::default_node_name())?,
        )?;
        let labels = ComponentSet::from_xml(
            element.require_child(&ComponentSet::<LabelEntry>::default_node_name())?,
        )?;
        Ok(Self {
            tracker: StateTracker::restored("ContentItem", key),
            title,
            body,
            properties,
            labels,
        })
    }

    fn to_delta_xml(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        delta::apply_parent_key(self.tracker.key_mut(), parent_key);
        let state = self.state();
        if state == ComponentState::Unmodified {
            return Ok(());
        }
        if state == ComponentState::MarkedForDelete {
            // Own delete element first; child deletes nest inside it.
            let mut own = self.scalar_xml();
            own.set_attribute(delta::ACTION_ATTRIBUTE, DeltaAction::Delete.as_str());
            let key = self.tracker.key().clone();
            self.properties.delta_deletes(&mut own, generator, Some(&key))?;
            self.labels.delta_deletes(&mut own, generator, Some(&key))?;
            out.add_child(own);
            return Ok(());
        }
        if self.tracker.state() == ComponentState::New {
            self.tracker.assign_key(generator)?;
        }
        let key = self.tracker.key().clone();
        // Deletes across all collections, then the own element, then live
        // children in declaration order.
        self.properties.delta_deletes(out, generator, Some(&key))?;
        self.labels.delta_deletes(out, generator, Some(&key))?;
        if let Some(action) = state.delta_action() {
            delta::push_with_action(out, self.scalar_xml(), action);
        }
        self.properties.delta_upserts(out, generator, Some(&key))?;
        self.labels.delta_upserts(out, generator, Some(&key))?;
        Ok(())
    }
}

/// A content item persisted once: three properties, one label, everything
/// `Unmodified` with assigned keys.
pub fn persisted_item() -> ContentItem {
    let mut item = ContentItem::new("Home page");
    item.set_body("Welcome");
    for (name, value) in [("author", "whitfield"), ("lang", "en"), ("status", "live")] {
        item.properties
            .add(PropertyEntry::new(name, value))
            .expect("add property");
    }
    item.labels.add(LabelEntry::new("featured")).expect("add label");

    let mut generator = ostore_model::SequentialKeyGenerator::new(100);
    let mut scratch = XmlElement::new("Scratch");
    item.to_delta_xml(&mut scratch, &mut generator, None)
        .expect("assign keys");
    item.set_persisted().expect("persist fixture");
    item
}
