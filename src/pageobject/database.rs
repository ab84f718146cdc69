//! Page-object database: loads definitions, resolves them, and answers member queries
//!
//! Each reload builds a fresh immutable [`DatabaseSnapshot`] and swaps it in whole.
//! Readers holding an `Arc` to the previous snapshot keep a consistent view.

use crate::error::{InspectorError, Result};
use crate::pageobject::definition::{DeclaredType, PageObjectDefinition};
use crate::pageobject::intrinsic::{IntrinsicMethod, catalog};
use crate::pageobject::member::{ElementDescriptor, Member, MethodDescriptor, ParsedPageObject};
use crate::pageobject::resolver::Resolver;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File suffixes accepted by [`DirectorySource`], longest first
const DEFINITION_SUFFIXES: &[&str] = &[".utam.json", ".json"];

/// Where raw page-object definitions come from
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Load every available definition, keyed by URI
    async fn load_definitions(&self) -> Result<IndexMap<String, PageObjectDefinition>>;
}

/// Definitions held in memory as JSON text
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: IndexMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition document (builder style)
    pub fn with_definition(mut self, uri: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert(uri, json);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, json: impl Into<String>) {
        self.documents.insert(uri.into(), json.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DefinitionSource for InMemorySource {
    async fn load_definitions(&self) -> Result<IndexMap<String, PageObjectDefinition>> {
        Ok(parse_documents(
            self.documents.iter().map(|(uri, text)| (uri.clone(), text.clone())),
        ))
    }
}

/// Definitions stored as `*.utam.json` / `*.json` files under a directory
///
/// A file at `<root>/utam/pageObjects/list.utam.json` gets the URI
/// `utam/pageObjects/list`, or `<namespace>/utam/pageObjects/list` when a
/// namespace is set.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    namespace: Option<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            namespace: None,
        }
    }

    /// Prefix every URI with a namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let trimmed = namespace.trim_matches('/');
        self.namespace = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URI for a definition file, or `None` if the file is not a definition
    pub fn uri_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut segments: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();

        let file_name = segments.pop()?;
        let stem = DEFINITION_SUFFIXES
            .iter()
            .find_map(|suffix| file_name.strip_suffix(suffix))
            .filter(|stem| !stem.is_empty())?;
        segments.push(stem.to_string());

        let uri = segments.join("/");
        Some(match &self.namespace {
            Some(namespace) => format!("{}/{}", namespace, uri),
            None => uri,
        })
    }

    async fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if dir == self.root => {
                    return Err(InspectorError::NoDefinitionsLoaded(format!(
                        "cannot read {}: {}",
                        dir.display(),
                        e
                    )));
                }
                Err(e) => {
                    log::warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl DefinitionSource for DirectorySource {
    async fn load_definitions(&self) -> Result<IndexMap<String, PageObjectDefinition>> {
        let mut documents = Vec::new();
        for path in self.collect_files().await? {
            let Some(uri) = self.uri_for(&path) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => documents.push((uri, text)),
                Err(e) => log::warn!("Failed to read {}: {}", path.display(), e),
            }
        }

        log::debug!("Read {} definition files from {}", documents.len(), self.root.display());
        Ok(parse_documents(documents))
    }
}

/// Parse documents, logging and skipping the ones that fail
fn parse_documents(documents: impl IntoIterator<Item = (String, String)>) -> IndexMap<String, PageObjectDefinition> {
    let mut definitions = IndexMap::new();
    for (uri, text) in documents {
        match PageObjectDefinition::from_json(&uri, &text) {
            Ok(definition) => {
                definitions.insert(uri, definition);
            }
            Err(e) => log::warn!("{}", e),
        }
    }
    definitions
}

/// One immutable, fully resolved generation of the database
#[derive(Debug, Clone, Default)]
pub struct DatabaseSnapshot {
    page_objects: IndexMap<String, ParsedPageObject>,
    root_uris: Vec<String>,
}

impl DatabaseSnapshot {
    /// Resolve a complete definition set
    pub fn build(definitions: &IndexMap<String, PageObjectDefinition>) -> Self {
        let page_objects = Resolver::new(definitions).resolve_all();

        let mut root_uris: Vec<String> = definitions
            .iter()
            .filter(|(uri, definition)| {
                definition.root && definition.root_css().is_some() && page_objects.contains_key(uri.as_str())
            })
            .map(|(uri, _)| uri.clone())
            .collect();
        root_uris.sort();

        Self {
            page_objects,
            root_uris,
        }
    }

    /// All URIs, sorted
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.page_objects.keys().map(String::as_str)
    }

    /// URIs of page objects loadable straight from the document, sorted
    pub fn root_uris(&self) -> &[String] {
        &self.root_uris
    }

    pub fn get(&self, uri: &str) -> Option<&ParsedPageObject> {
        self.page_objects.get(uri)
    }

    pub fn is_known_uri(&self, uri: &str) -> bool {
        self.page_objects.contains_key(uri)
    }

    /// Public elements and methods of a page object; empty for unknown URIs
    pub fn public_members(&self, uri: &str) -> Vec<Member> {
        self.get(uri).map(ParsedPageObject::public_members).unwrap_or_default()
    }

    /// Element or method by name
    pub fn member(&self, uri: &str, name: &str) -> Result<Member> {
        let page_object = self
            .get(uri)
            .ok_or_else(|| InspectorError::UnknownPageObject(uri.to_string()))?;
        page_object.member(name).ok_or_else(|| InspectorError::UnknownMember {
            uri: uri.to_string(),
            member: name.to_string(),
        })
    }

    pub fn element(&self, uri: &str, name: &str) -> Option<&ElementDescriptor> {
        self.get(uri)?.elements.get(name)
    }

    pub fn method(&self, uri: &str, name: &str) -> Option<&MethodDescriptor> {
        self.get(uri)?.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.page_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_objects.is_empty()
    }
}

/// Intrinsic operations available for a declared element type
///
/// Always includes the basic group; capability arrays add the groups they name.
pub fn intrinsic_members(declared: Option<&DeclaredType>) -> Vec<IntrinsicMethod> {
    let capabilities = declared.map(DeclaredType::capabilities).unwrap_or_default();
    catalog().members_for(capabilities.as_slice()).into_values().collect()
}

/// Holder of the current snapshot
#[derive(Debug, Default)]
pub struct PageObjectDatabase {
    snapshot: Option<Arc<DatabaseSnapshot>>,
}

impl PageObjectDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from a source and swap in the new snapshot
    ///
    /// Returns the number of resolved page objects. On failure the previous
    /// snapshot is dropped and queries report `NoDefinitionsLoaded`.
    pub async fn reload(&mut self, source: &dyn DefinitionSource) -> Result<usize> {
        match source.load_definitions().await {
            Ok(definitions) => Ok(self.install(&definitions)),
            Err(e) => {
                self.clear();
                log::warn!("Definition reload failed: {}", e);
                Err(match e {
                    InspectorError::NoDefinitionsLoaded(reason) => InspectorError::NoDefinitionsLoaded(reason),
                    other => InspectorError::NoDefinitionsLoaded(other.to_string()),
                })
            }
        }
    }

    /// Resolve an already loaded definition set and swap it in
    pub fn install(&mut self, definitions: &IndexMap<String, PageObjectDefinition>) -> usize {
        let snapshot = DatabaseSnapshot::build(definitions);
        let count = snapshot.len();
        log::debug!(
            "Installed {} page objects ({} loadable from the document)",
            count,
            snapshot.root_uris().len()
        );
        self.snapshot = Some(Arc::new(snapshot));
        count
    }

    /// Drop the current snapshot
    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Result<Arc<DatabaseSnapshot>> {
        self.snapshot
            .clone()
            .ok_or_else(|| InspectorError::NoDefinitionsLoaded("reload the database first".to_string()))
    }

    pub fn get_by_uri(&self, uri: &str) -> Result<ParsedPageObject> {
        self.snapshot()?
            .get(uri)
            .cloned()
            .ok_or_else(|| InspectorError::UnknownPageObject(uri.to_string()))
    }

    pub fn is_known_uri(&self, uri: &str) -> bool {
        self.snapshot.as_ref().is_some_and(|snapshot| snapshot.is_known_uri(uri))
    }

    pub fn public_members(&self, uri: &str) -> Result<Vec<Member>> {
        Ok(self.snapshot()?.public_members(uri))
    }

    pub fn intrinsic_members(&self, declared: Option<&DeclaredType>) -> Vec<IntrinsicMethod> {
        intrinsic_members(declared)
    }
}
