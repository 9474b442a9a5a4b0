//! Scene files: a page, its box tree and a scripted list of host events
//!
//! ```toml
//! [page]
//! width = 600
//! height = 800
//! padding = 20
//!
//! [[box]]
//! name = "main"
//! kind = "section"
//! style = { height = "400px" }
//!
//! [[box]]
//! name = "logo"
//! parent = "main"
//! position = "absolute"
//! style = { left = "-30px", top = "10px", width = "100px", height = "40px" }
//!
//! [[event]]
//! type = "update"
//! box = "logo"
//!
//! [[event]]
//! type = "tick"
//! ```
//!
//! Boxes declared up front form the initial tree and are not announced to
//! the engine. Boxes created by an `add` event are inserted and then
//! announced with a box-added event.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::config::EngineConfig;
use crate::constraint::Handle;
use crate::engine::{Effect, Engine, HostEvent};
use crate::error::SceneError;
use crate::geometry::{Point, Rect, StyleLayout};
use crate::model::{BoxId, BoxKind, BoxSpec, Document, NodeRef, PositionMode, Property, Style, TablePart};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    page: PageDecl,
    #[serde(default, rename = "box")]
    boxes: Vec<BoxDecl>,
    #[serde(default, rename = "event")]
    events: Vec<EventDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageDecl {
    width: f64,
    height: f64,
    #[serde(default)]
    padding: f64,
    /// Extra page style, applied over the size and padding
    #[serde(default)]
    style: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum KindDecl {
    Header,
    Footer,
    Section,
    #[default]
    Box,
    Table,
    RowGroup,
    Row,
    Cell,
}

impl From<KindDecl> for BoxKind {
    fn from(kind: KindDecl) -> Self {
        match kind {
            KindDecl::Header => BoxKind::Header,
            KindDecl::Footer => BoxKind::Footer,
            KindDecl::Section => BoxKind::Section,
            KindDecl::Box => BoxKind::Ordinary,
            KindDecl::Table => BoxKind::TableStructure(TablePart::Table),
            KindDecl::RowGroup => BoxKind::TableStructure(TablePart::RowGroup),
            KindDecl::Row => BoxKind::TableStructure(TablePart::Row),
            KindDecl::Cell => BoxKind::TableStructure(TablePart::Cell),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct BoxDecl {
    name: String,
    #[serde(default)]
    kind: KindDecl,
    /// Parent box name; the page when absent
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    style: BTreeMap<String, String>,
    /// Natural image size, `[width, height]`
    #[serde(default)]
    image: Option<[f64; 2]>,
    #[serde(default)]
    repeat_columns: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum EventDecl {
    Add {
        #[serde(rename = "box")]
        decl: BoxDecl,
    },
    Remove {
        #[serde(rename = "box")]
        target: String,
    },
    /// Host-side style change, followed by a box-updated event
    Update {
        #[serde(rename = "box")]
        target: String,
        #[serde(default)]
        style: BTreeMap<String, String>,
    },
    DragStart {
        #[serde(rename = "box")]
        target: String,
        pointer: [f64; 2],
        #[serde(default)]
        selection: Vec<String>,
    },
    Drag {
        #[serde(rename = "box")]
        target: String,
        pointer: [f64; 2],
    },
    DragEnd {
        #[serde(rename = "box")]
        target: String,
        pointer: [f64; 2],
        #[serde(default)]
        force: bool,
    },
    ResizeInit {
        #[serde(rename = "box")]
        target: String,
        handle: String,
    },
    ResizeUpdate {
        #[serde(rename = "box")]
        target: String,
        /// `[left, top, width, height]` in the parent's frame
        rect: [f64; 4],
        #[serde(default)]
        force: bool,
    },
    ResizeEnd {
        #[serde(rename = "box")]
        target: String,
    },
    Tick,
}

impl EventDecl {
    fn name(&self) -> &'static str {
        match self {
            EventDecl::Add { .. } => "add",
            EventDecl::Remove { .. } => "remove",
            EventDecl::Update { .. } => "update",
            EventDecl::DragStart { .. } => "drag-start",
            EventDecl::Drag { .. } => "drag",
            EventDecl::DragEnd { .. } => "drag-end",
            EventDecl::ResizeInit { .. } => "resize-init",
            EventDecl::ResizeUpdate { .. } => "resize-update",
            EventDecl::ResizeEnd { .. } => "resize-end",
            EventDecl::Tick => "tick",
        }
    }
}

/// A loaded scene, ready to run
#[derive(Debug, Clone)]
pub struct Scene {
    source: String,
    file: SceneFile,
}

/// Effects of one scripted event
#[derive(Debug, Clone, PartialEq)]
pub struct StepEffects {
    /// Position in the event list
    pub index: usize,
    pub event: &'static str,
    pub target: Option<String>,
    pub effects: Vec<Effect>,
}

/// Final state after running a scene
#[derive(Debug, Clone)]
pub struct SceneRun {
    pub document: Document,
    pub steps: Vec<StepEffects>,
}

impl SceneRun {
    /// Every effect of the run, in order
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.steps.iter().flat_map(|s| s.effects.iter())
    }

    /// Box with the given name in the final document
    pub fn find(&self, name: &str) -> Option<BoxId> {
        self.document.find(name)
    }

    /// Textual effect log, one line per effect
    pub fn effect_log(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            let target = step.target.as_deref().unwrap_or("-");
            for effect in &step.effects {
                out.push_str(&format!("[{}] {} {}: {}\n", step.index, step.event, target, effect));
            }
        }
        out
    }
}

impl fmt::Display for SceneRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let file: SceneFile = toml::from_str(content)?;
        if !(file.page.width > 0.0 && file.page.height > 0.0) {
            return Err(SceneError::invalid("page width and height must be positive").locate(content, "[page]"));
        }
        Ok(Self {
            source: content.to_string(),
            file,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn event_count(&self) -> usize {
        self.file.events.len()
    }

    /// Build the initial document: the page and every declared box
    pub fn document(&self) -> Result<Document, SceneError> {
        let page = &self.file.page;
        let mut doc = Document::with_page(page.width, page.height, page.padding);
        let extra = self.style(&page.style)?;
        for (property, value) in extra.iter() {
            doc.page_style_mut().set(property, value);
        }
        for decl in &self.file.boxes {
            self.insert(&mut doc, decl)?;
        }
        Ok(doc)
    }

    /// Run the event script against the initial document
    pub fn run(&self, config: &EngineConfig) -> Result<SceneRun, SceneError> {
        let mut doc = self.document()?;
        let mut engine = Engine::new(config.clone());
        let geo = StyleLayout;
        let mut steps = Vec::with_capacity(self.file.events.len());

        for (index, decl) in self.file.events.iter().enumerate() {
            let mut effects = Vec::new();
            let target = match decl {
                EventDecl::Add { decl } => {
                    let id = self.insert(&mut doc, decl)?;
                    effects.extend(engine.handle(&mut doc, &geo, HostEvent::BoxAdded { id }));
                    Some(decl.name.clone())
                }
                EventDecl::Update { target, style } => {
                    let id = self.resolve(&doc, target)?;
                    let style = self.style(style)?;
                    if let Some(node) = doc.get_mut(id) {
                        for (property, value) in style.iter() {
                            node.style.set(property, value);
                        }
                    }
                    effects.extend(engine.handle(&mut doc, &geo, HostEvent::BoxUpdated { id }));
                    Some(target.clone())
                }
                other => {
                    let event = self.host_event(&doc, other)?;
                    let target = event.target().and_then(|id| doc.get(id)).and_then(|n| n.name.clone());
                    effects.extend(engine.handle(&mut doc, &geo, event));
                    target
                }
            };
            tracing::debug!(index, event = decl.name(), effects = effects.len(), "scene step");
            steps.push(StepEffects {
                index,
                event: decl.name(),
                target,
                effects,
            });
        }

        Ok(SceneRun { document: doc, steps })
    }

    fn resolve(&self, doc: &Document, name: &str) -> Result<BoxId, SceneError> {
        doc.find(name).ok_or_else(|| {
            SceneError::UnknownBox {
                name: name.to_string(),
                span: None,
            }
            .locate(&self.source, &format!("\"{}\"", name))
        })
    }

    fn style(&self, entries: &BTreeMap<String, String>) -> Result<Style, SceneError> {
        let mut style = Style::new();
        for (key, value) in entries {
            let property: Property = key
                .parse()
                .map_err(|e| SceneError::invalid(format!("{}", e)).locate(&self.source, key))?;
            style.set(property, value.clone());
        }
        Ok(style)
    }

    fn insert(&self, doc: &mut Document, decl: &BoxDecl) -> Result<BoxId, SceneError> {
        if doc.find(&decl.name).is_some() {
            return Err(SceneError::invalid(format!("box '{}' is declared twice", decl.name))
                .locate(&self.source, &format!("\"{}\"", decl.name)));
        }
        let parent = match &decl.parent {
            Some(name) => NodeRef::Box(self.resolve(doc, name)?),
            None => NodeRef::Page,
        };

        let mut spec = BoxSpec::new(decl.kind.into()).with_name(decl.name.clone());
        if let Some(position) = &decl.position {
            let mode = PositionMode::from_keyword(position).ok_or_else(|| {
                SceneError::invalid(format!("unknown position '{}'", position))
                    .locate(&self.source, &format!("\"{}\"", position))
            })?;
            spec = spec.with_position(mode);
        }
        for (property, value) in self.style(&decl.style)?.iter() {
            if property == Property::Position {
                if let Some(mode) = PositionMode::from_keyword(value) {
                    spec = spec.with_position(mode);
                }
                continue;
            }
            spec.style.set(property, value);
        }
        if let Some([width, height]) = decl.image {
            spec = spec.with_image(width, height);
        }
        if let Some(columns) = decl.repeat_columns {
            spec = spec.with_repeat_columns(columns);
        }

        doc.insert(parent, spec).ok_or_else(|| {
            SceneError::invalid(format!("cannot insert '{}'", decl.name))
                .locate(&self.source, &format!("\"{}\"", decl.name))
        })
    }

    fn host_event(&self, doc: &Document, decl: &EventDecl) -> Result<HostEvent, SceneError> {
        let point = |p: &[f64; 2]| Point::new(p[0], p[1]);
        let event = match decl {
            EventDecl::Remove { target } => HostEvent::BoxRemoved {
                id: self.resolve(doc, target)?,
            },
            EventDecl::DragStart {
                target,
                pointer,
                selection,
            } => {
                let id = self.resolve(doc, target)?;
                let mut ids = vec![id];
                for name in selection {
                    let other = self.resolve(doc, name)?;
                    if !ids.contains(&other) {
                        ids.push(other);
                    }
                }
                HostEvent::DragStart {
                    id,
                    pointer: point(pointer),
                    selection: ids,
                }
            }
            EventDecl::Drag { target, pointer } => HostEvent::Drag {
                id: self.resolve(doc, target)?,
                pointer: point(pointer),
            },
            EventDecl::DragEnd { target, pointer, force } => HostEvent::DragEnd {
                id: self.resolve(doc, target)?,
                pointer: point(pointer),
                force_override: *force,
            },
            EventDecl::ResizeInit { target, handle } => HostEvent::ResizeInit {
                id: self.resolve(doc, target)?,
                handle: handle.parse::<Handle>().map_err(|e| {
                    SceneError::invalid(e.to_string()).locate(&self.source, &format!("\"{}\"", handle))
                })?,
            },
            EventDecl::ResizeUpdate { target, rect, force } => HostEvent::ResizeUpdate {
                id: self.resolve(doc, target)?,
                proposed: Rect::new(rect[0], rect[1], rect[2], rect[3]),
                force_override: *force,
            },
            EventDecl::ResizeEnd { target } => HostEvent::ResizeEnd {
                id: self.resolve(doc, target)?,
            },
            EventDecl::Tick => HostEvent::FrameTick,
            EventDecl::Add { .. } | EventDecl::Update { .. } => {
                return Err(SceneError::invalid(format!("'{}' is not a host event", decl.name())))
            }
        };
        Ok(event)
    }
}
