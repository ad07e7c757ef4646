//! Go Interface Scanner
//!
//! Walks a project tree, parses Go sources with tree-sitter and extracts
//! every top-level interface declaration together with its method
//! signatures.

pub mod render;

pub use render::{render_type, ChanDir, TypeShape};

use {
    crate::error::ScanError,
    crate::types::{InterfaceDefinition, MethodSignature, Parameter},
    globset::{Glob, GlobSet, GlobSetBuilder},
    render::node_text,
    std::path::{Path, PathBuf},
    tracing::{debug, warn},
    tree_sitter::{Node, Parser, Tree},
    walkdir::{DirEntry, WalkDir},
};

const GO_EXTENSION: &str = "go";
const TEST_FILE_SUFFIX: &str = "_test.go";
const VENDOR_DIR: &str = "vendor";

/// Include/exclude glob patterns matched against paths relative to the
/// scanned root.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl ScanFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            include: build_glob_set(include)?,
            exclude: build_glob_set(exclude)?,
        })
    }

    /// Whether a file (relative to the scan root) should be parsed.
    pub fn accepts(&self, relative: &Path) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(relative) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(relative),
            None => true,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>, ScanError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| ScanError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })
}

/// Scans Go source code for interface definitions.
///
/// The scanner holds no parse state between calls; each file gets its own
/// parser.
#[derive(Debug, Clone, Default)]
pub struct GoInterfaceScanner {
    filter: ScanFilter,
}

impl GoInterfaceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: ScanFilter) -> Self {
        Self { filter }
    }

    /// Recursively scan a project for interfaces.
    ///
    /// Files that fail to read or parse are skipped; only a failure to walk
    /// the root itself is an error.
    pub fn scan_project(&self, root: &Path) -> Result<Vec<InterfaceDefinition>, ScanError> {
        let mut interfaces = Vec::new();
        let mut files_scanned = 0usize;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_vendor_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::Walk {
                        path: root.to_path_buf(),
                        source: e,
                    })
                }
                Err(e) => {
                    warn!(error = %e, event = "walk_error", "Skipping unreadable entry");
                    continue;
                }
            };

            if !is_candidate_source(&entry) {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if !self.filter.accepts(relative) {
                debug!(path = %relative.display(), "Filtered out by scan patterns");
                continue;
            }

            files_scanned += 1;
            match self.scan_file(entry.path()) {
                Ok(found) => interfaces.extend(found),
                Err(e) => {
                    debug!(error = %e, event = "file_skipped", "Skipping file");
                }
            }
        }

        debug!(
            root = %root.display(),
            files_scanned,
            interfaces_found = interfaces.len(),
            event = "scan_complete",
            "Project scan complete"
        );
        Ok(interfaces)
    }

    /// Parse one file and return its top-level interfaces.
    pub fn scan_file(&self, path: &Path) -> Result<Vec<InterfaceDefinition>, ScanError> {
        let source = read_source(path)?;
        self.scan_source(path, &source)
    }

    /// Extract interfaces from already loaded source text.
    pub fn scan_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<InterfaceDefinition>, ScanError> {
        let tree = parse_go(path, source)?;
        let bytes = source.as_bytes();
        let root = tree.root_node();
        let package = package_name(root, bytes);

        let mut interfaces = Vec::new();
        let mut cursor = root.walk();
        let declarations: Vec<Node<'_>> = root
            .named_children(&mut cursor)
            .filter(|node| node.kind() == "type_declaration")
            .collect();

        for declaration in declarations {
            let group_doc = leading_comments(declaration, bytes);
            let mut spec_cursor = declaration.walk();
            let specs: Vec<Node<'_>> = declaration
                .named_children(&mut spec_cursor)
                .filter(|node| matches!(node.kind(), "type_spec" | "type_alias"))
                .collect();

            for spec in specs {
                let (Some(name), Some(ty)) = (
                    spec.child_by_field_name("name"),
                    spec.child_by_field_name("type"),
                ) else {
                    continue;
                };
                if ty.kind() != "interface_type" {
                    continue;
                }

                let own_doc = leading_comments(spec, bytes);
                let comments = if own_doc.is_empty() {
                    group_doc.clone()
                } else {
                    own_doc
                };

                interfaces.push(InterfaceDefinition {
                    name: node_text(name, bytes),
                    package: package.clone(),
                    methods: interface_methods(ty, bytes),
                    file_path: path.to_path_buf(),
                    line_number: spec.start_position().row + 1,
                    comments,
                });
            }
        }

        Ok(interfaces)
    }

    /// Find one interface by name within a single file.
    pub fn extract_interface_metadata(
        &self,
        path: &Path,
        interface_name: &str,
    ) -> Result<InterfaceDefinition, ScanError> {
        self.scan_file(path)?
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| ScanError::InterfaceNotFound {
                name: interface_name.to_string(),
                path: path.to_path_buf(),
            })
    }

    /// Distinct import paths of a file, in declaration order.
    pub fn detect_dependencies(&self, path: &Path) -> Result<Vec<String>, ScanError> {
        let source = read_source(path)?;
        let tree = parse_go(path, &source)?;
        let bytes = source.as_bytes();
        let root = tree.root_node();

        let mut imports: Vec<String> = Vec::new();
        let mut cursor = root.walk();
        let declarations: Vec<Node<'_>> = root
            .named_children(&mut cursor)
            .filter(|node| node.kind() == "import_declaration")
            .collect();

        for declaration in declarations {
            for spec in import_specs(declaration) {
                let Some(path_node) = spec.child_by_field_name("path") else {
                    continue;
                };
                let import = node_text(path_node, bytes)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
                if !imports.contains(&import) {
                    imports.push(import);
                }
            }
        }

        Ok(imports)
    }
}

fn read_source(path: &Path) -> Result<String, ScanError> {
    std::fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_go(path: &Path, source: &str) -> Result<Tree, ScanError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ScanError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ScanError::Parse {
            path: path.to_path_buf(),
        })?;

    // tree-sitter recovers from syntax errors; a tree with error nodes is
    // treated as a failed parse.
    if tree.root_node().has_error() {
        return Err(ScanError::Parse {
            path: path.to_path_buf(),
        });
    }
    Ok(tree)
}

fn is_vendor_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == VENDOR_DIR
}

fn is_candidate_source(entry: &DirEntry) -> bool {
    if !entry.file_type().is_file() {
        return false;
    }
    let path = entry.path();
    let is_go = path.extension().is_some_and(|ext| ext == GO_EXTENSION);
    let is_test = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.ends_with(TEST_FILE_SUFFIX));
    is_go && !is_test
}

fn package_name(root: Node<'_>, source: &[u8]) -> String {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|node| node.kind() == "package_clause");
    let Some(clause) = clause else {
        return String::new();
    };
    let mut clause_cursor = clause.walk();
    let ident = clause
        .named_children(&mut clause_cursor)
        .find(|node| node.kind() == "package_identifier");
    ident.map(|node| node_text(node, source)).unwrap_or_default()
}

fn import_specs(declaration: Node<'_>) -> Vec<Node<'_>> {
    let mut specs = Vec::new();
    let mut cursor = declaration.walk();
    for child in declaration.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => specs.push(child),
            "import_spec_list" => {
                let mut list_cursor = child.walk();
                specs.extend(
                    child
                        .named_children(&mut list_cursor)
                        .filter(|node| node.kind() == "import_spec"),
                );
            }
            _ => {}
        }
    }
    specs
}

fn interface_methods(interface: Node<'_>, source: &[u8]) -> Vec<MethodSignature> {
    let mut cursor = interface.walk();
    let elements: Vec<Node<'_>> = interface
        .named_children(&mut cursor)
        .filter(|node| matches!(node.kind(), "method_elem" | "method_spec"))
        .collect();

    elements
        .into_iter()
        .filter_map(|element| method_signature(element, source))
        .collect()
}

fn method_signature(element: Node<'_>, source: &[u8]) -> Option<MethodSignature> {
    let name = element.child_by_field_name("name")?;

    let parameters = element
        .child_by_field_name("parameters")
        .map(|list| parameter_list(list, source))
        .unwrap_or_default();

    let returns = match element.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => parameter_list(result, source),
        Some(result) => vec![Parameter::unnamed(render_type(result, source))],
        None => Vec::new(),
    };

    Some(MethodSignature {
        name: node_text(name, source),
        parameters,
        returns,
        comments: leading_comments(element, source),
    })
}

fn parameter_list(list: Node<'_>, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = list.walk();
    let declarations: Vec<Node<'_>> = list.named_children(&mut cursor).collect();

    for declaration in declarations {
        let ty = match (declaration.kind(), declaration.child_by_field_name("type")) {
            ("parameter_declaration", Some(ty)) => render_type(ty, source),
            ("variadic_parameter_declaration", Some(ty)) => {
                TypeShape::Variadic(Box::new(TypeShape::from_node(ty, source))).to_string()
            }
            _ => continue,
        };

        let mut name_cursor = declaration.walk();
        let names: Vec<String> = declaration
            .children_by_field_name("name", &mut name_cursor)
            .map(|name| node_text(name, source))
            .collect();

        if names.is_empty() {
            parameters.push(Parameter::unnamed(ty));
        } else {
            parameters.extend(names.into_iter().map(|name| Parameter::named(name, ty.clone())));
        }
    }

    parameters
}

/// Comment lines directly above `node`, with the `//` marker stripped.
///
/// A comment counts only if it ends on the line before the node (or before
/// the next comment in the block) and does not trail other code.
fn leading_comments(node: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        if prev.kind() != "comment" || prev.end_position().row + 1 != expected_row {
            break;
        }
        let trailing = prev
            .prev_named_sibling()
            .is_some_and(|before| before.end_position().row == prev.start_position().row);
        if trailing {
            break;
        }
        let text = node_text(prev, source);
        lines.push(text.strip_prefix("//").unwrap_or(&text).to_string());
        expected_row = prev.start_position().row;
        current = prev.prev_sibling();
    }

    lines.reverse();
    lines
}

/// Resolve a project path to an absolute path without touching the
/// filesystem.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}
