//! An in-memory page for driving the extractor and filler without Chrome.
//!
//! The document is kept as HTML text and re-parsed with `scraper` on every
//! query. Nodes are addressed by their path of element-child indices from
//! `<html>`; content is only ever appended at the end of a container, so a
//! path stays valid for the lifetime of a document.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use workday_autofill::{Error, FormPage, Navigator, Result};

const POPUP_ATTR: &str = "data-fake-popup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode(Vec<usize>);

/// What clicking an element with a given id does, consumed one per click.
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Append `html` where `<!--slot:NAME-->` sits.
    Insert { slot: String, html: String },
    /// Swap in a new document.
    Replace(String),
}

#[derive(Debug, Clone)]
struct PopupDef {
    html: String,
    close_on_select: bool,
}

#[derive(Default)]
struct State {
    html: String,
    popups: HashMap<String, PopupDef>,
    open_popup: Option<String>,
    reactions: HashMap<String, VecDeque<Reaction>>,
    routes: HashMap<String, String>,
    values: HashMap<Vec<usize>, String>,
    checked: HashMap<Vec<usize>, bool>,
    clicks: Vec<String>,
    picked: Vec<String>,
    keys: Vec<String>,
    uploads: Vec<(String, Vec<PathBuf>)>,
    visited: Vec<String>,
    screenshots: Vec<PathBuf>,
}

impl State {
    fn render(&self) -> String {
        let Some(trigger) = &self.open_popup else {
            return self.html.clone();
        };
        let Some(popup_def) = self.popups.get(trigger) else {
            return self.html.clone();
        };
        let popup = format!(r#"<div {POPUP_ATTR}="{trigger}">{}</div>"#, popup_def.html);
        match self.html.rfind("</body>") {
            Some(at) => format!("{}{popup}{}", &self.html[..at], &self.html[at..]),
            None => format!("{}{popup}", self.html),
        }
    }

    fn replace_document(&mut self, html: String) {
        self.html = html;
        self.open_popup = None;
        self.values.clear();
        self.checked.clear();
    }
}

pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        let state = State {
            html: html.into(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Clicking `trigger_id` toggles a listbox that closes once an option
    /// is picked.
    pub fn with_popup(self, trigger_id: &str, html: &str) -> Self {
        self.register_popup(trigger_id, html, true)
    }

    /// Like [`FakePage::with_popup`], but stays open across picks.
    pub fn with_sticky_popup(self, trigger_id: &str, html: &str) -> Self {
        self.register_popup(trigger_id, html, false)
    }

    fn register_popup(self, trigger_id: &str, html: &str, close_on_select: bool) -> Self {
        self.lock().popups.insert(
            trigger_id.to_string(),
            PopupDef {
                html: html.to_string(),
                close_on_select,
            },
        );
        self
    }

    pub fn on_click(self, id: &str, reaction: Reaction) -> Self {
        self.lock()
            .reactions
            .entry(id.to_string())
            .or_default()
            .push_back(reaction);
        self
    }

    /// Serve `html` when `url` is visited.
    pub fn with_route(self, url: &str, html: &str) -> Self {
        self.lock().routes.insert(url.to_string(), html.to_string());
        self
    }

    pub fn popup_open(&self) -> bool {
        self.lock().open_popup.is_some()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    /// Captions of the popup options clicked so far.
    pub fn picked(&self) -> Vec<String> {
        self.lock().picked.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys.clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.lock().uploads.clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.lock().screenshots.clone()
    }

    pub fn html(&self) -> String {
        self.lock().render()
    }

    /// The live value of the element with `id`.
    pub fn value_of(&self, id: &str) -> Option<String> {
        let css = format!(r#"[id="{id}"]"#);
        self.with_doc(|doc, state| {
            let selector = Selector::parse(&css).ok()?;
            let el = doc.select(&selector).next()?;
            Some(live_value(state, el))
        })
    }

    pub fn is_checked_id(&self, id: &str) -> bool {
        let css = format!(r#"[id="{id}"]"#);
        self.with_doc(|doc, state| {
            let Ok(selector) = Selector::parse(&css) else {
                return false;
            };
            doc.select(&selector)
                .next()
                .is_some_and(|el| live_checked(state, el))
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake page state poisoned")
    }

    fn with_doc<R>(&self, f: impl FnOnce(&Html, &mut State) -> R) -> R {
        let mut state = self.lock();
        let doc = Html::parse_document(&state.render());
        f(&doc, &mut state)
    }

    fn with_node<R>(
        &self,
        node: &FakeNode,
        f: impl FnOnce(ElementRef<'_>, &mut State) -> R,
    ) -> Result<R> {
        self.with_doc(|doc, state| {
            let el = resolve(doc, &node.0)
                .ok_or_else(|| Error::ElementNotFound(format!("stale node {:?}", node.0)))?;
            Ok(f(el, state))
        })
    }

    fn click_element(el: ElementRef<'_>, state: &mut State) {
        let id = el.value().attr("id").map(str::to_string);
        state
            .clicks
            .push(id.clone().unwrap_or_else(|| text_of(el)));

        let in_popup = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().attr(POPUP_ATTR).is_some());
        if in_popup {
            let is_option = el.value().attr("role") == Some("option")
                || el.value().attr("data-automation-id").is_some();
            if is_option {
                state.picked.push(text_of(el));
                let closes = state
                    .open_popup
                    .as_ref()
                    .and_then(|t| state.popups.get(t))
                    .is_some_and(|def| def.close_on_select);
                if closes {
                    state.open_popup = None;
                }
            }
            return;
        }

        match (el.value().name(), el.value().attr("type")) {
            ("input", Some("checkbox")) => {
                let now = live_checked(state, el);
                state.checked.insert(path_of(el), !now);
            }
            ("input", Some("radio")) => {
                if let Some(name) = el.value().attr("name") {
                    let siblings: Vec<Vec<usize>> = root_of(el)
                        .descendants()
                        .filter_map(ElementRef::wrap)
                        .filter(|r| r.value().attr("type") == Some("radio"))
                        .filter(|r| r.value().attr("name") == Some(name))
                        .map(path_of)
                        .collect();
                    for path in siblings {
                        state.checked.insert(path, false);
                    }
                }
                state.checked.insert(path_of(el), true);
            }
            _ => {}
        }

        let Some(id) = id else {
            return;
        };
        if state.popups.contains_key(&id) {
            state.open_popup = match state.open_popup.take() {
                Some(open) if open == id => None,
                _ => Some(id),
            };
            return;
        }
        let reaction = state.reactions.get_mut(&id).and_then(VecDeque::pop_front);
        match reaction {
            Some(Reaction::Insert { slot, html }) => {
                let marker = format!("<!--slot:{slot}-->");
                if let Some(at) = state.html.find(&marker) {
                    state.html.insert_str(at, &html);
                }
            }
            Some(Reaction::Replace(html)) => state.replace_document(html),
            None => {}
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::SelectorError(format!("{css}: {e:?}")))
}

fn resolve<'a>(doc: &'a Html, path: &[usize]) -> Option<ElementRef<'a>> {
    let mut el = doc.root_element();
    for &index in path {
        el = el.children().filter_map(ElementRef::wrap).nth(index)?;
    }
    Some(el)
}

fn path_of(el: ElementRef<'_>) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = *el;
    while let Some(parent) = node.parent() {
        if ElementRef::wrap(parent).is_none() {
            break;
        }
        let index = parent
            .children()
            .filter(|c| c.value().is_element())
            .position(|c| c.id() == node.id())
            .unwrap_or_default();
        path.push(index);
        node = parent;
    }
    path.reverse();
    path
}

fn root_of(el: ElementRef<'_>) -> ElementRef<'_> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .last()
        .unwrap_or(el)
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn live_value(state: &State, el: ElementRef<'_>) -> String {
    if let Some(value) = state.values.get(&path_of(el)) {
        return value.clone();
    }
    if el.value().name() == "textarea" {
        return el.text().collect();
    }
    el.value().attr("value").unwrap_or_default().to_string()
}

fn live_checked(state: &State, el: ElementRef<'_>) -> bool {
    state
        .checked
        .get(&path_of(el))
        .copied()
        .unwrap_or_else(|| el.value().attr("checked").is_some())
}

#[async_trait]
impl FormPage for FakePage {
    type Node = FakeNode;

    async fn query_all(&self, scope: Option<&FakeNode>, selector: &str) -> Result<Vec<FakeNode>> {
        let selector = parse_selector(selector)?;
        self.with_doc(|doc, _| match scope {
            Some(scope) => {
                let root = resolve(doc, &scope.0)
                    .ok_or_else(|| Error::ElementNotFound(format!("stale scope {:?}", scope.0)))?;
                Ok(root.select(&selector).map(|el| FakeNode(path_of(el))).collect())
            }
            None => Ok(doc.select(&selector).map(|el| FakeNode(path_of(el))).collect()),
        })
    }

    async fn attribute(&self, node: &FakeNode, name: &str) -> Result<Option<String>> {
        self.with_node(node, |el, _| el.value().attr(name).map(str::to_string))
    }

    async fn inner_text(&self, node: &FakeNode) -> Result<String> {
        self.with_node(node, |el, _| text_of(el))
    }

    async fn input_value(&self, node: &FakeNode) -> Result<String> {
        self.with_node(node, |el, state| live_value(state, el))
    }

    async fn is_checked(&self, node: &FakeNode) -> Result<bool> {
        self.with_node(node, |el, state| live_checked(state, el))
    }

    async fn click(&self, node: &FakeNode) -> Result<()> {
        self.with_node(node, Self::click_element)
    }

    async fn fill(&self, node: &FakeNode, text: &str) -> Result<()> {
        self.with_node(node, |el, state| {
            state.values.insert(path_of(el), text.to_string());
        })
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.lock();
        state.keys.push(key.to_string());
        if key == "Escape" {
            state.open_popup = None;
        }
        Ok(())
    }

    async fn set_input_files(&self, node: &FakeNode, files: &[PathBuf]) -> Result<()> {
        self.with_node(node, |el, state| {
            let id = el.value().attr("id").unwrap_or_default().to_string();
            state.uploads.push((id, files.to_vec()));
        })
    }
}

#[async_trait]
impl Navigator for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.visited.push(url.to_string());
        if let Some(html) = state.routes.get(url).cloned() {
            state.replace_document(html);
        }
        Ok(())
    }

    async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        self.lock().screenshots.push(path.to_path_buf());
        Ok(())
    }
}

/// Wrap `body` in a minimal document.
pub fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head></head><body>{body}</body></html>")
}

/// A Workday-style progress bar; `current` is the 0-based active step.
pub fn progress_bar(steps: &[&str], current: usize) -> String {
    let items: String = steps
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let automation = if i == current {
                "progressBarActiveStep"
            } else if i < current {
                "progressBarCompletedStep"
            } else {
                "progressBarInactiveStep"
            };
            let status = if i == current { "current step" } else { "step" };
            format!(
                r#"<li data-automation-id="{automation}"><label>{status}</label><label>{name}</label></li>"#
            )
        })
        .collect();
    format!(r#"<ol data-automation-id="progressBar">{items}</ol>"#)
}

/// A plain text field container.
pub fn text_field(automation: &str, id: &str, label: &str, value: &str) -> String {
    format!(
        r#"<div data-automation-id="formField-{automation}"><label for="{id}">{label}</label><input type="text" id="{id}" value="{value}"></div>"#
    )
}

/// `<li role="option">` items inside a listbox.
pub fn listbox(options: &[&str]) -> String {
    let items: String = options
        .iter()
        .map(|o| format!(r#"<li role="option">{o}</li>"#))
        .collect();
    format!(r#"<ul role="listbox">{items}</ul>"#)
}

/// Prompt options as rendered for multi-selects.
pub fn prompt_options(options: &[&str]) -> String {
    options
        .iter()
        .map(|o| format!(r#"<div data-automation-id="promptOption">{o}</div>"#))
        .collect()
}
