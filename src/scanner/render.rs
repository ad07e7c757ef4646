//! Rendering of Go type expressions.
//!
//! A syntax node is first classified into a [`TypeShape`], then rendered
//! with [`std::fmt::Display`]. Classification never fails: shapes the
//! renderer does not model become [`TypeShape::Unknown`].

use {std::fmt, tree_sitter::Node};

/// Direction of a Go channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Closed set of type shapes the scanner knows how to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// `T`, `pkg.T` or an instantiated generic `T[A, B]`
    Named {
        package: Option<String>,
        name: String,
        args: Vec<TypeShape>,
    },
    Pointer(Box<TypeShape>),
    Slice(Box<TypeShape>),
    Array {
        len: String,
        elem: Box<TypeShape>,
    },
    Map {
        key: Box<TypeShape>,
        value: Box<TypeShape>,
    },
    Channel {
        dir: ChanDir,
        elem: Box<TypeShape>,
    },
    Variadic(Box<TypeShape>),
    Function,
    Interface,
    Unknown,
}

impl TypeShape {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Classify a tree-sitter type node.
    pub fn from_node(node: Node<'_>, source: &[u8]) -> Self {
        match node.kind() {
            "type_identifier" | "identifier" | "package_identifier" => {
                Self::named(node_text(node, source))
            }
            "qualified_type" => {
                let package = node
                    .child_by_field_name("package")
                    .map(|p| node_text(p, source));
                match node.child_by_field_name("name") {
                    Some(name) => Self::Named {
                        package,
                        name: node_text(name, source),
                        args: Vec::new(),
                    },
                    None => Self::Unknown,
                }
            }
            "generic_type" => {
                let base = node
                    .child_by_field_name("type")
                    .map(|t| Self::from_node(t, source));
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|list| {
                        let mut cursor = list.walk();
                        let args: Vec<Self> = list
                            .named_children(&mut cursor)
                            .filter(|arg| arg.kind() != "comment")
                            .map(|arg| Self::from_node(arg, source))
                            .collect();
                        args
                    })
                    .unwrap_or_default();
                match base {
                    Some(Self::Named { package, name, .. }) => Self::Named {
                        package,
                        name,
                        args,
                    },
                    _ => Self::Unknown,
                }
            }
            // A single-term type argument is wrapped in a type_elem node.
            "type_elem" | "parenthesized_type" => match single_named_child(node) {
                Some(inner) => Self::from_node(inner, source),
                None => Self::Unknown,
            },
            "pointer_type" => match single_named_child(node) {
                Some(inner) => Self::Pointer(Box::new(Self::from_node(inner, source))),
                None => Self::Unknown,
            },
            "slice_type" => match node.child_by_field_name("element") {
                Some(elem) => Self::Slice(Box::new(Self::from_node(elem, source))),
                None => Self::Unknown,
            },
            "array_type" => {
                match (
                    node.child_by_field_name("length"),
                    node.child_by_field_name("element"),
                ) {
                    (Some(len), Some(elem)) => Self::Array {
                        len: node_text(len, source),
                        elem: Box::new(Self::from_node(elem, source)),
                    },
                    _ => Self::Unknown,
                }
            }
            "map_type" => {
                match (
                    node.child_by_field_name("key"),
                    node.child_by_field_name("value"),
                ) {
                    (Some(key), Some(value)) => Self::Map {
                        key: Box::new(Self::from_node(key, source)),
                        value: Box::new(Self::from_node(value, source)),
                    },
                    _ => Self::Unknown,
                }
            }
            "channel_type" => match node.child_by_field_name("value") {
                Some(value) => Self::channel(channel_direction(node), value, source),
                None => Self::Unknown,
            },
            "function_type" => Self::Function,
            "interface_type" => Self::Interface,
            _ => Self::Unknown,
        }
    }

    // The arrow binds to the leftmost `chan`: the grammar reads `chan<- chan T`
    // as `chan (<-chan T)`, which Go defines as `chan<- (chan T)`.
    fn channel(dir: ChanDir, value: Node<'_>, source: &[u8]) -> Self {
        if dir == ChanDir::Both
            && value.kind() == "channel_type"
            && channel_direction(value) == ChanDir::Recv
        {
            if let Some(inner) = value.child_by_field_name("value") {
                return Self::Channel {
                    dir: ChanDir::Send,
                    elem: Box::new(Self::channel(ChanDir::Both, inner, source)),
                };
            }
        }
        Self::Channel {
            dir,
            elem: Box::new(Self::from_node(value, source)),
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                package,
                name,
                args,
            } => {
                if let Some(package) = package {
                    write!(f, "{package}.")?;
                }
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(elem) => write!(f, "[]{elem}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Channel { dir, elem } => match dir {
                ChanDir::Both
                    if matches!(
                        elem.as_ref(),
                        Self::Channel {
                            dir: ChanDir::Recv,
                            ..
                        }
                    ) =>
                {
                    write!(f, "chan ({elem})")
                }
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            Self::Variadic(elem) => write!(f, "...{elem}"),
            Self::Function => write!(f, "func"),
            Self::Interface => write!(f, "interface{{}}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Render a type node straight to its textual form.
pub fn render_type(node: Node<'_>, source: &[u8]) -> String {
    TypeShape::from_node(node, source).to_string()
}

pub(crate) fn node_text(node: Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn single_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}

// `<-chan T` starts with the arrow, `chan<- T` has it after the keyword.
fn channel_direction(node: Node<'_>) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node.children(&mut cursor).map(|c| c.kind()).collect();
    match tokens.iter().position(|kind| *kind == "<-") {
        Some(0) => ChanDir::Recv,
        Some(_) => ChanDir::Send,
        None => ChanDir::Both,
    }
}
