//! Location parsing and the view-state tree.
//!
//! A location is a string of the form
//! `#/<app>/<tab>?/<view>?!<page>/<filter>/<sort>/<tag>/<search>` — one to
//! three path segments naming a node in the view tree, then five fields
//! written into that node's leaf state. The search field is greedy and may
//! contain unescaped `/` (filesystem paths, search expressions); everything
//! else is percent-encoded. Malformed locations fall back to the default
//! route without partial recovery.

use std::borrow::Cow;

/// Leaf state of one view: everything needed to re-issue its fetch plus the
/// cursor position to restore when the view becomes visible again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: u64,
    /// Filter tag name, `-` for none.
    pub filter: String,
    /// Sort tag name, `-` prefix for descending.
    pub sort: String,
    pub tag: String,
    pub search: String,
    pub scroll_pos: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 0,
            filter: "-".to_string(),
            sort: "-".to_string(),
            tag: "-".to_string(),
            search: String::new(),
            scroll_pos: 0,
        }
    }
}

/// The view tree has exactly three addressable shapes — app-leaf, tab-leaf
/// and view-leaf — distinguished by variant, never by probing fields.
#[derive(Debug, Clone)]
pub enum AppNode {
    Leaf(ViewState),
    Tabs { active: usize, tabs: Vec<TabEntry> },
}

#[derive(Debug, Clone)]
pub struct TabEntry {
    pub name: String,
    pub node: TabNode,
}

#[derive(Debug, Clone)]
pub enum TabNode {
    Leaf(ViewState),
    Views { active: usize, views: Vec<ViewEntry> },
}

#[derive(Debug, Clone)]
pub struct ViewEntry {
    pub name: String,
    pub state: ViewState,
}

struct AppEntry {
    name: String,
    node: AppNode,
}

/// Fully resolved (app, tab, view) triple addressing one leaf of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub app: String,
    pub tab: Option<String>,
    pub view: Option<String>,
}

impl RouteKey {
    pub fn breadcrumb(&self) -> String {
        let mut s = self.app.clone();
        if let Some(tab) = &self.tab {
            s.push_str(" ▸ ");
            s.push_str(tab);
        }
        if let Some(view) = &self.view {
            s.push_str(" ▸ ");
            s.push_str(view);
        }
        s
    }
}

/// The five location fields, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    pub page: u64,
    pub filter: String,
    pub sort: String,
    pub tag: String,
    pub search: String,
}

impl RouteParams {
    fn of(state: &ViewState) -> Self {
        Self {
            page: state.page,
            filter: state.filter.clone(),
            sort: state.sort.clone(),
            tag: state.tag.clone(),
            search: state.search.clone(),
        }
    }
}

/// Partial field overrides for [`Router::location_for`]; unset fields keep
/// the values currently stored for the target leaf.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub page: Option<u64>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl Overrides {
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            page: Some(0),
            ..Self::default()
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            page: Some(0),
            ..Self::default()
        }
    }
}

/// Result of one navigation: where we landed, with which parameters, whether
/// the visible view switched, and the generation stamping the fetch this
/// navigation triggers.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub key: RouteKey,
    pub params: RouteParams,
    pub generation: u64,
    pub view_changed: bool,
}

/// Cached result of the previous resolution, used to tell navigation
/// transitions from in-place parameter changes.
#[derive(Debug, Clone)]
struct RoutePoint {
    key: RouteKey,
    params: RouteParams,
}

pub struct Router {
    apps: Vec<AppEntry>,
    current: Option<RoutePoint>,
    last: Option<RoutePoint>,
    generation: u64,
}

fn decode(s: &str) -> Option<String> {
    urlencoding::decode(s).ok().map(Cow::into_owned)
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Raw grammar parse: decoded path segments plus decoded fields. `None` on
/// any malformation: missing prefix, missing `!`, bad segment count, or a
/// non-numeric page.
fn parse_location(loc: &str) -> Option<(Vec<String>, RouteParams)> {
    let rest = loc.strip_prefix("#/")?;
    let (path, fields) = rest.split_once('!')?;

    let mut raw: Vec<&str> = path.split('/').collect();
    // A single trailing slash before `!` is tolerated; interior empties are not.
    if raw.len() > 1 && raw.last() == Some(&"") {
        raw.pop();
    }
    if raw.is_empty() || raw.len() > 3 || raw.iter().any(|s| s.is_empty()) {
        return None;
    }
    let mut segments = Vec::with_capacity(raw.len());
    for seg in raw {
        segments.push(decode(seg)?);
    }

    let parts: Vec<&str> = fields.splitn(5, '/').collect();
    if parts.len() < 4 {
        return None;
    }
    let page: u64 = decode(parts[0])?.parse().ok()?;
    let filter = decode(parts[1])?;
    let sort = decode(parts[2])?;
    let tag = decode(parts[3])?;
    // Greedy remainder; absent fifth field reads as an empty search.
    let search = decode(parts.get(4).copied().unwrap_or(""))?;

    Some((
        segments,
        RouteParams {
            page,
            filter,
            sort,
            tag,
            search,
        },
    ))
}

/// Canonical serialization; every segment and field percent-encoded,
/// including `/` inside the search field.
pub fn format_location(key: &RouteKey, params: &RouteParams) -> String {
    let mut s = String::from("#/");
    s.push_str(&encode(&key.app));
    if let Some(tab) = &key.tab {
        s.push('/');
        s.push_str(&encode(tab));
    }
    if let Some(view) = &key.view {
        s.push('/');
        s.push_str(&encode(view));
    }
    s.push('!');
    s.push_str(&params.page.to_string());
    s.push('/');
    s.push_str(&encode(&params.filter));
    s.push('/');
    s.push_str(&encode(&params.sort));
    s.push('/');
    s.push_str(&encode(&params.tag));
    s.push('/');
    s.push_str(&encode(&params.search));
    s
}

fn leaf_app(name: &str) -> AppEntry {
    AppEntry {
        name: name.to_string(),
        node: AppNode::Leaf(ViewState::default()),
    }
}

fn leaf_tab(name: &str) -> TabEntry {
    TabEntry {
        name: name.to_string(),
        node: TabNode::Leaf(ViewState::default()),
    }
}

fn view(name: &str) -> ViewEntry {
    ViewEntry {
        name: name.to_string(),
        state: ViewState::default(),
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Builds the fixed view tree. The shape never changes after this; only
    /// leaf values and `active` pointers do. The first app is the default
    /// route.
    pub fn new() -> Self {
        let apps = vec![
            leaf_app("Home"),
            leaf_app("Playback"),
            AppEntry {
                name: "Queue".to_string(),
                node: AppNode::Tabs {
                    active: 0,
                    tabs: vec![
                        leaf_tab("Current"),
                        leaf_tab("LastPlayed"),
                        leaf_tab("Jukebox"),
                    ],
                },
            },
            AppEntry {
                name: "Browse".to_string(),
                node: AppNode::Tabs {
                    active: 0,
                    tabs: vec![
                        TabEntry {
                            name: "Database".to_string(),
                            node: TabNode::Views {
                                active: 0,
                                views: vec![view("TagList"), view("AlbumList")],
                            },
                        },
                        leaf_tab("Filesystem"),
                        TabEntry {
                            name: "Playlist".to_string(),
                            node: TabNode::Views {
                                active: 0,
                                views: vec![view("List"), view("Detail")],
                            },
                        },
                    ],
                },
            },
            leaf_app("Search"),
        ];
        Self {
            apps,
            current: None,
            last: None,
            generation: 0,
        }
    }

    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_key(&self) -> Option<RouteKey> {
        self.current.as_ref().map(|c| c.key.clone())
    }

    pub fn current_params(&self) -> Option<RouteParams> {
        self.current.as_ref().map(|c| c.params.clone())
    }

    pub fn last_key(&self) -> Option<RouteKey> {
        self.last.as_ref().map(|l| l.key.clone())
    }

    fn app_entry(&self, name: &str) -> Option<&AppEntry> {
        self.apps.iter().find(|a| a.name == name)
    }

    /// Resolves a (possibly partial) path to a full key. The node's shape
    /// decides how deep the key reaches: a leaf app swallows any extra
    /// segments, a tabbed app defaults its tab from the `active` pointer,
    /// and a tab with views defaults its view likewise. Unknown names fail.
    pub fn complete_key(
        &self,
        app: &str,
        tab: Option<&str>,
        view: Option<&str>,
    ) -> Option<RouteKey> {
        let entry = self.app_entry(app)?;
        match &entry.node {
            AppNode::Leaf(_) => Some(RouteKey {
                app: entry.name.clone(),
                tab: None,
                view: None,
            }),
            AppNode::Tabs { active, tabs } => {
                let tab_entry = match tab {
                    Some(name) => tabs.iter().find(|t| t.name == name)?,
                    None => tabs.get(*active)?,
                };
                match &tab_entry.node {
                    TabNode::Leaf(_) => Some(RouteKey {
                        app: entry.name.clone(),
                        tab: Some(tab_entry.name.clone()),
                        view: None,
                    }),
                    TabNode::Views { active, views } => {
                        let view_entry = match view {
                            Some(name) => views.iter().find(|v| v.name == name)?,
                            None => views.get(*active)?,
                        };
                        Some(RouteKey {
                            app: entry.name.clone(),
                            tab: Some(tab_entry.name.clone()),
                            view: Some(view_entry.name.clone()),
                        })
                    }
                }
            }
        }
    }

    /// The first-configured app, completed through active pointers.
    pub fn default_key(&self) -> RouteKey {
        let name = self.apps.first().map(|a| a.name.clone()).unwrap_or_default();
        self.complete_key(&name, None, None).unwrap_or(RouteKey {
            app: name,
            tab: None,
            view: None,
        })
    }

    pub fn leaf(&self, key: &RouteKey) -> Option<&ViewState> {
        let entry = self.app_entry(&key.app)?;
        match &entry.node {
            AppNode::Leaf(state) => Some(state),
            AppNode::Tabs { tabs, .. } => {
                let tab = tabs.iter().find(|t| Some(&t.name) == key.tab.as_ref())?;
                match &tab.node {
                    TabNode::Leaf(state) => Some(state),
                    TabNode::Views { views, .. } => views
                        .iter()
                        .find(|v| Some(&v.name) == key.view.as_ref())
                        .map(|v| &v.state),
                }
            }
        }
    }

    fn leaf_mut(&mut self, key: &RouteKey) -> Option<&mut ViewState> {
        let entry = self.apps.iter_mut().find(|a| a.name == key.app)?;
        match &mut entry.node {
            AppNode::Leaf(state) => Some(state),
            AppNode::Tabs { tabs, .. } => {
                let tab = tabs
                    .iter_mut()
                    .find(|t| Some(&t.name) == key.tab.as_ref())?;
                match &mut tab.node {
                    TabNode::Leaf(state) => Some(state),
                    TabNode::Views { views, .. } => views
                        .iter_mut()
                        .find(|v| Some(&v.name) == key.view.as_ref())
                        .map(|v| &mut v.state),
                }
            }
        }
    }

    /// Points the `active` markers along the key's path so later locations
    /// that omit the tab or view land here again.
    fn set_active(&mut self, key: &RouteKey) {
        let Some(entry) = self.apps.iter_mut().find(|a| a.name == key.app) else {
            return;
        };
        if let AppNode::Tabs { active, tabs } = &mut entry.node {
            if let Some(idx) = tabs
                .iter()
                .position(|t| Some(&t.name) == key.tab.as_ref())
            {
                *active = idx;
                if let TabNode::Views { active, views } = &mut tabs[idx].node {
                    if let Some(vidx) = views
                        .iter()
                        .position(|v| Some(&v.name) == key.view.as_ref())
                    {
                        *active = vidx;
                    }
                }
            }
        }
    }

    pub fn scroll_of(&self, key: &RouteKey) -> usize {
        self.leaf(key).map_or(0, |l| l.scroll_pos)
    }

    /// Resolves a location string against the tree, writes the fields into
    /// the addressed leaf, and advances the fetch generation. A location
    /// that fails to parse or names unknown nodes resolves to the default
    /// route with that leaf's stored values. When the (app, tab, view)
    /// triple changes, `visible_scroll` is persisted into the leaf being
    /// left so the view can restore its cursor later.
    pub fn navigate(&mut self, location: &str, visible_scroll: usize) -> Navigation {
        let resolved = parse_location(location).and_then(|(segments, params)| {
            let key = self.complete_key(
                &segments[0],
                segments.get(1).map(String::as_str),
                segments.get(2).map(String::as_str),
            )?;
            Some((key, params))
        });

        let (key, params) = match resolved {
            Some(hit) => hit,
            None => {
                let key = self.default_key();
                let params = self
                    .leaf(&key)
                    .map(RouteParams::of)
                    .unwrap_or(RouteParams {
                        page: 0,
                        filter: "-".to_string(),
                        sort: "-".to_string(),
                        tag: "-".to_string(),
                        search: String::new(),
                    });
                (key, params)
            }
        };

        let view_changed = self
            .current
            .as_ref()
            .map_or(true, |c| c.key != key);

        if view_changed {
            if let Some(prev) = self.current.as_ref().map(|c| c.key.clone()) {
                if let Some(leaf) = self.leaf_mut(&prev) {
                    leaf.scroll_pos = visible_scroll;
                }
            }
        }

        if let Some(leaf) = self.leaf_mut(&key) {
            leaf.page = params.page;
            leaf.filter = params.filter.clone();
            leaf.sort = params.sort.clone();
            leaf.tag = params.tag.clone();
            leaf.search = params.search.clone();
        }
        self.set_active(&key);

        self.generation += 1;
        self.last = self.current.take();
        self.current = Some(RoutePoint {
            key: key.clone(),
            params: params.clone(),
        });

        Navigation {
            key,
            params,
            generation: self.generation,
            view_changed,
        }
    }

    /// Re-issues the current route under a fresh generation, superseding any
    /// fetch still in flight for it. `None` before the first navigation.
    pub fn refresh(&mut self) -> Option<Navigation> {
        let key = self.current.as_ref()?.key.clone();
        let params = self.leaf(&key).map(RouteParams::of)?;
        self.generation += 1;
        self.current = Some(RoutePoint {
            key: key.clone(),
            params: params.clone(),
        });
        Some(Navigation {
            key,
            params,
            generation: self.generation,
            view_changed: false,
        })
    }

    /// Inverse of [`Router::navigate`]: builds a location for a target,
    /// defaulting every unspecified field to the values currently stored
    /// for that target's leaf — changing one field preserves the rest.
    pub fn location_for(
        &self,
        app: &str,
        tab: Option<&str>,
        view: Option<&str>,
        overrides: Overrides,
    ) -> Option<String> {
        let key = self.complete_key(app, tab, view)?;
        let stored = self.leaf(&key)?;
        let params = RouteParams {
            page: overrides.page.unwrap_or(stored.page),
            filter: overrides.filter.unwrap_or_else(|| stored.filter.clone()),
            sort: overrides.sort.unwrap_or_else(|| stored.sort.clone()),
            tag: overrides.tag.unwrap_or_else(|| stored.tag.clone()),
            search: overrides.search.unwrap_or_else(|| stored.search.clone()),
        };
        Some(format_location(&key, &params))
    }

    /// Location re-targeting the current view with field overrides.
    pub fn relocate(&self, overrides: Overrides) -> Option<String> {
        let key = self.current_key()?;
        self.location_for(
            &key.app,
            key.tab.as_deref(),
            key.view.as_deref(),
            overrides,
        )
    }

    pub fn default_location(&self) -> String {
        let key = self.default_key();
        let params = self
            .leaf(&key)
            .map(RouteParams::of)
            .unwrap_or(RouteParams {
                page: 0,
                filter: "-".to_string(),
                sort: "-".to_string(),
                tag: "-".to_string(),
                search: String::new(),
            });
        format_location(&key, &params)
    }

    /// Next or previous tab within the key's app, completed through the
    /// target tab's own active view. `None` for tab-less apps.
    pub fn cycle_tab(&self, key: &RouteKey, forward: bool) -> Option<RouteKey> {
        let entry = self.app_entry(&key.app)?;
        let AppNode::Tabs { tabs, .. } = &entry.node else {
            return None;
        };
        let idx = tabs
            .iter()
            .position(|t| Some(&t.name) == key.tab.as_ref())?;
        let next = if forward {
            (idx + 1) % tabs.len()
        } else {
            (idx + tabs.len() - 1) % tabs.len()
        };
        self.complete_key(&key.app, Some(tabs[next].name.as_str()), None)
    }

    /// Next or previous view within the key's tab. `None` for view-less tabs.
    pub fn cycle_view(&self, key: &RouteKey, forward: bool) -> Option<RouteKey> {
        let entry = self.app_entry(&key.app)?;
        let AppNode::Tabs { tabs, .. } = &entry.node else {
            return None;
        };
        let tab = tabs.iter().find(|t| Some(&t.name) == key.tab.as_ref())?;
        let TabNode::Views { views, .. } = &tab.node else {
            return None;
        };
        let idx = views
            .iter()
            .position(|v| Some(&v.name) == key.view.as_ref())?;
        let next = if forward {
            (idx + 1) % views.len()
        } else {
            (idx + views.len() - 1) % views.len()
        };
        self.complete_key(&key.app, key.tab.as_deref(), Some(views[next].name.as_str()))
    }
}
