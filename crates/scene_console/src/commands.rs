//! Console command parsing and execution.
//!
//! Lines take either form:
//!
//! ```text
//!   EditDynComp(1, add, EC_DynamicComponent, speed, real, 2.5)
//!   EditDynComp 1 rem EC_DynamicComponent speed
//! ```
//!
//! Arguments may be double quoted to keep separators inside them.

use scene_component::{AttributeChange, Component, ComponentPtr, DynamicComponent, EntityId};
use scene_manager::{Entity, EntityPtr, Scene};
use scene_xml::{Element, XmlError};
use tracing::debug;

/// Outcome of one console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success(Option<String>),
    Failure(String),
}

impl CommandResult {
    fn ok() -> Self {
        Self::Success(None)
    }

    fn output(text: impl Into<String>) -> Self {
        Self::Success(Some(text.into()))
    }

    fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}

/// How documents are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xml,
    Json,
}

impl DocumentFormat {
    pub fn render(self, element: &Element) -> Result<String, XmlError> {
        match self {
            Self::Xml => scene_xml::to_string(element),
            Self::Json => scene_xml::to_json(element),
        }
    }
}

/// Split a command line into its name and arguments. `None` for blank
/// lines and `#` comments.
pub fn parse_line(line: &str) -> Option<(String, Vec<String>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Some(open) = line.find('(') {
        let name = line[..open].trim().to_string();
        let inner = line[open + 1..].trim_end();
        let inner = inner.strip_suffix(')').unwrap_or(inner);
        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_args(inner, Separator::Comma)
        };
        return Some((name, args));
    }
    let mut parts = split_args(line, Separator::Whitespace).into_iter();
    let name = parts.next()?;
    Some((name, parts.collect()))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Separator {
    Comma,
    Whitespace,
}

impl Separator {
    fn matches(self, c: char) -> bool {
        match self {
            Self::Comma => c == ',',
            Self::Whitespace => c.is_whitespace(),
        }
    }
}

fn split_args(text: &str, separator: Separator) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    for c in text.chars() {
        if c == '"' {
            if !in_quotes && !was_quoted && current.trim().is_empty() {
                current.clear();
            }
            in_quotes = !in_quotes;
            was_quoted = true;
        } else if in_quotes {
            current.push(c);
        } else if separator.matches(c) {
            flush(&mut args, &mut current, was_quoted, separator);
            was_quoted = false;
        } else if !(was_quoted && c.is_whitespace()) {
            current.push(c);
        }
    }
    flush(&mut args, &mut current, was_quoted, separator);
    args
}

fn flush(args: &mut Vec<String>, current: &mut String, was_quoted: bool, separator: Separator) {
    let arg = std::mem::take(current);
    if was_quoted {
        args.push(arg);
        return;
    }
    let arg = arg.trim();
    // Runs of whitespace count as one separator.
    if arg.is_empty() && separator == Separator::Whitespace {
        return;
    }
    args.push(arg.to_string());
}

/// A scene plus the command set that edits it.
pub struct Console {
    scene: Scene,
    format: DocumentFormat,
}

impl Console {
    #[must_use]
    pub fn new(scene: Scene, format: DocumentFormat) -> Self {
        Self { scene, format }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn render_scene(&self) -> Result<String, XmlError> {
        self.format.render(&self.scene.serialize_to_document())
    }

    /// Run one command line. Blank lines succeed without output.
    pub fn execute(&mut self, line: &str) -> CommandResult {
        let Some((name, args)) = parse_line(line) else {
            return CommandResult::ok();
        };
        debug!(command = %name, args = args.len(), "executing console command");
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match name.as_str() {
            "EditDynComp" | "EditDynamicComponent" => self.edit_dynamic_component(&args),
            "CreateEntity" => self.create_entity(&args),
            "RemoveEntity" => self.remove_entity(&args),
            "AddComponent" => self.add_component(&args),
            "RemoveComponent" => self.remove_component(&args),
            "Set" => self.set_attribute(&args),
            "Exec" => self.exec(&args),
            "Dump" => self.dump(&args),
            other => CommandResult::failure(format!("unknown command {other}")),
        }
    }

    fn find_entity(&self, id: &str) -> Result<EntityPtr, CommandResult> {
        id.parse::<EntityId>()
            .ok()
            .and_then(|id| self.scene.entity(id))
            .ok_or_else(|| CommandResult::failure(format!("Cannot find entity by name of {id}")))
    }

    /// `id, add, type, attrName, attrType, value` or `id, rem, type, attrName`.
    /// Other argument counts do nothing.
    fn edit_dynamic_component(&mut self, args: &[&str]) -> CommandResult {
        match *args {
            [id, operation, type_name, attribute, attribute_type, value] => {
                let entity = match self.find_entity(id) {
                    Ok(entity) => entity,
                    Err(failure) => return failure,
                };
                if operation != "add" {
                    return CommandResult::ok();
                }
                let Some(component) = entity.borrow().component(type_name) else {
                    return wrong_component(type_name);
                };
                let mut component = component.borrow_mut();
                let Some(dynamic) = component.downcast_mut::<DynamicComponent>() else {
                    return wrong_component(type_name);
                };
                if dynamic.create_attribute(attribute_type, attribute).is_none() {
                    return CommandResult::failure(format!(
                        "invalid attribute type {attribute_type}"
                    ));
                }
                let written =
                    dynamic.set_attribute_from_string(attribute, value, AttributeChange::Local);
                dynamic.component_changed(AttributeChange::Local);
                match written {
                    Ok(_) => CommandResult::ok(),
                    Err(e) => CommandResult::failure(e.to_string()),
                }
            }
            [id, operation, type_name, attribute] => {
                let entity = match self.find_entity(id) {
                    Ok(entity) => entity,
                    Err(failure) => return failure,
                };
                if operation != "rem" {
                    return CommandResult::ok();
                }
                let Some(component) = entity.borrow().component(type_name) else {
                    return wrong_component(type_name);
                };
                let mut component = component.borrow_mut();
                let Some(dynamic) = component.downcast_mut::<DynamicComponent>() else {
                    return wrong_component(type_name);
                };
                dynamic.remove_attribute(attribute);
                dynamic.component_changed(AttributeChange::Local);
                CommandResult::ok()
            }
            _ => CommandResult::ok(),
        }
    }

    fn create_entity(&mut self, args: &[&str]) -> CommandResult {
        let entity = match args.first() {
            None => self.scene.create_entity(AttributeChange::Local),
            Some(text) => {
                let created = text
                    .parse::<EntityId>()
                    .ok()
                    .and_then(|id| self.scene.create_entity_with_id(id, AttributeChange::Local));
                match created {
                    Some(entity) => entity,
                    None => return CommandResult::failure(format!("cannot create entity {text}")),
                }
            }
        };
        let id = entity.borrow().id();
        CommandResult::output(format!("created entity {id}"))
    }

    fn remove_entity(&mut self, args: &[&str]) -> CommandResult {
        let [id] = *args else {
            return usage("RemoveEntity id");
        };
        match id.parse::<EntityId>() {
            Ok(id) if self.scene.remove_entity(id, AttributeChange::Local) => CommandResult::ok(),
            _ => CommandResult::failure(format!("Cannot find entity by name of {id}")),
        }
    }

    fn add_component(&mut self, args: &[&str]) -> CommandResult {
        let (id, type_name, name) = match *args {
            [id, type_name] => (id, type_name, ""),
            [id, type_name, name] => (id, type_name, name),
            _ => return usage("AddComponent id type [name]"),
        };
        let entity = match self.find_entity(id) {
            Ok(entity) => entity,
            Err(failure) => return failure,
        };
        let created = entity
            .borrow_mut()
            .get_or_create_component_named(type_name, name, AttributeChange::Local);
        match created {
            Some(_) => CommandResult::ok(),
            None => CommandResult::failure(format!("unknown component type {type_name}")),
        }
    }

    fn remove_component(&mut self, args: &[&str]) -> CommandResult {
        let (id, type_name, name) = match *args {
            [id, type_name] => (id, type_name, ""),
            [id, type_name, name] => (id, type_name, name),
            _ => return usage("RemoveComponent id type [name]"),
        };
        let entity = match self.find_entity(id) {
            Ok(entity) => entity,
            Err(failure) => return failure,
        };
        let mut entity = entity.borrow_mut();
        let Some(component) = entity.component_named(type_name, name) else {
            return wrong_component(type_name);
        };
        entity.remove_component(&component, AttributeChange::Local);
        CommandResult::ok()
    }

    fn set_attribute(&mut self, args: &[&str]) -> CommandResult {
        let [id, type_name, attribute, value] = *args else {
            return usage("Set id type attribute value");
        };
        let entity = match self.find_entity(id) {
            Ok(entity) => entity,
            Err(failure) => return failure,
        };
        let Some(component) = entity.borrow().component(type_name) else {
            return wrong_component(type_name);
        };
        set_from_string(&component, attribute, value)
    }

    fn exec(&mut self, args: &[&str]) -> CommandResult {
        let [id, action, params @ ..] = args else {
            return usage("Exec id action [params...]");
        };
        let entity = match self.find_entity(id) {
            Ok(entity) => entity,
            Err(failure) => return failure,
        };
        if Entity::exec(&entity, action, params) {
            CommandResult::ok()
        } else {
            CommandResult::output(format!("no receivers for action {action}"))
        }
    }

    fn dump(&self, args: &[&str]) -> CommandResult {
        let element = match args.first() {
            None => self.scene.serialize_to_document(),
            Some(id) => {
                let entity = match self.find_entity(id) {
                    Ok(entity) => entity,
                    Err(failure) => return failure,
                };
                let mut holder = Element::default();
                entity.borrow().serialize_to(&mut holder);
                match holder.children.pop() {
                    Some(element) => element,
                    None => return CommandResult::ok(),
                }
            }
        };
        match self.format.render(&element) {
            Ok(text) => CommandResult::output(text),
            Err(e) => CommandResult::failure(e.to_string()),
        }
    }
}

fn set_from_string(component: &ComponentPtr, attribute: &str, value: &str) -> CommandResult {
    let result = component
        .borrow_mut()
        .set_attribute_from_string(attribute, value, AttributeChange::Local);
    match result {
        Ok(true) => CommandResult::ok(),
        Ok(false) => CommandResult::failure(format!("no attribute {attribute}")),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

fn wrong_component(type_name: &str) -> CommandResult {
    CommandResult::failure(format!("Wrong component type name {type_name}"))
}

fn usage(text: &str) -> CommandResult {
    CommandResult::failure(format!("usage: {text}"))
}
