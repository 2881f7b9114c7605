//! Go type model.
//!
//! [`TypeExpr`] is a type expression as written in a source file, lowered
//! from the tree-sitter tree. [`TypeRef`] is the same expression after
//! identifiers have been resolved against package scope, the universe and
//! the declaring file's imports.

use serde::Serialize;

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Byte,
    Rune,
}

impl BasicKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Byte => "byte",
            Self::Rune => "rune",
        }
    }

    /// Zero value literal.
    pub fn zero(self) -> &'static str {
        match self {
            Self::Bool => "false",
            Self::String => "\"\"",
            _ => "0",
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Type literals that are kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Func,
    Interface,
    Struct,
    Other,
}

/// A piece of a type literal: verbatim text or an embedded type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment<T> {
    Text(String),
    Type(T),
}

/// A type expression as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { len: String, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    Literal {
        kind: LiteralKind,
        segments: Vec<Segment<TypeExpr>>,
    },
}

impl TypeExpr {
    /// Name of a plain, pointer or instantiated identifier, with the pointer flag.
    pub fn base_name(&self) -> Option<(&str, bool)> {
        match self {
            Self::Name(name) => Some((name, false)),
            Self::Pointer(inner) => match inner.as_ref() {
                Self::Name(name) => Some((name, true)),
                Self::Generic { base, .. } => base.base_name().map(|(n, _)| (n, true)),
                _ => None,
            },
            Self::Generic { base, .. } => base.base_name(),
            _ => None,
        }
    }
}

/// Underlying shape of a package-local defined type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Underlying {
    Basic(BasicKind),
    /// struct or array
    Composite,
    Pointer,
    Interface,
    /// slice, map, chan or func
    Nilable,
    /// defined on a type whose shape is not visible from this package
    Opaque,
}

impl Underlying {
    /// Whether a defined type with this underlying type may declare methods.
    pub fn can_bear_methods(self) -> bool {
        !matches!(self, Self::Pointer | Self::Interface)
    }
}

/// A named type from another package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalType {
    /// Import path of the declaring package
    pub path: String,
    /// The declaring package's own name
    pub package_name: String,
    /// Qualifier used in the source file
    pub qualifier: String,
    pub name: String,
    /// Known only for types declared in the package being inspected that are
    /// referenced from a generated file in another package
    pub underlying: Option<Underlying>,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Basic(BasicKind),
    /// The predeclared `error` interface
    Error,
    /// A type declared at package scope in the package being inspected
    Local { name: String, underlying: Underlying },
    External(ExternalType),
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Array { len: String, elem: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Chan { dir: ChanDir, elem: Box<TypeRef> },
    Generic { base: Box<TypeRef>, args: Vec<TypeRef> },
    TypeParam(String),
    /// `any`, `comparable` and other predeclared interfaces besides `error`
    Universe(String),
    Literal {
        kind: LiteralKind,
        segments: Vec<Segment<TypeRef>>,
    },
}

impl TypeRef {
    /// True only for the predeclared `error` type. A package-level type that
    /// happens to be named `error` resolves to [`TypeRef::Local`] instead.
    pub fn is_universal_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Visit every external named type reachable from this reference.
    pub fn for_each_external<'a>(&'a self, visit: &mut dyn FnMut(&'a ExternalType)) {
        match self {
            Self::External(ext) => visit(ext),
            Self::Pointer(inner) | Self::Slice(inner) => inner.for_each_external(visit),
            Self::Array { elem, .. } | Self::Chan { elem, .. } => elem.for_each_external(visit),
            Self::Map { key, value } => {
                key.for_each_external(visit);
                value.for_each_external(visit);
            }
            Self::Generic { base, args } => {
                base.for_each_external(visit);
                for arg in args {
                    arg.for_each_external(visit);
                }
            }
            Self::Literal { segments, .. } => {
                for segment in segments {
                    if let Segment::Type(ty) = segment {
                        ty.for_each_external(visit);
                    }
                }
            }
            Self::Basic(_)
            | Self::Error
            | Self::Local { .. }
            | Self::TypeParam(_)
            | Self::Universe(_) => {}
        }
    }

    /// Render as Go source. `qualify` maps an external type to the qualifier
    /// the generated file uses for its package.
    pub fn render(&self, qualify: &dyn Fn(&ExternalType) -> String) -> String {
        match self {
            Self::Basic(kind) => kind.name().to_string(),
            Self::Error => "error".to_string(),
            Self::Local { name, .. } => name.clone(),
            Self::External(ext) => match qualify(ext) {
                q if q.is_empty() => ext.name.clone(),
                q => format!("{}.{}", q, ext.name),
            },
            Self::Pointer(inner) => format!("*{}", inner.render(qualify)),
            Self::Slice(inner) => format!("[]{}", inner.render(qualify)),
            Self::Array { len, elem } => format!("[{}]{}", len, elem.render(qualify)),
            Self::Map { key, value } => {
                format!("map[{}]{}", key.render(qualify), value.render(qualify))
            }
            Self::Chan { dir, elem } => {
                let elem = elem.render(qualify);
                match dir {
                    ChanDir::Both => format!("chan {elem}"),
                    ChanDir::Send => format!("chan<- {elem}"),
                    ChanDir::Recv => format!("<-chan {elem}"),
                }
            }
            Self::Generic { base, args } => {
                let args: Vec<String> = args.iter().map(|a| a.render(qualify)).collect();
                format!("{}[{}]", base.render(qualify), args.join(", "))
            }
            Self::TypeParam(name) | Self::Universe(name) => name.clone(),
            Self::Literal { segments, .. } => segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) => text.clone(),
                    Segment::Type(ty) => ty.render(qualify),
                })
                .collect(),
        }
    }

    /// Zero value expression, used as the call argument for an unnamed
    /// parameter.
    ///
    /// External named types get a composite literal `q.T{}`; their underlying
    /// shape is not visible here, so that literal is not valid for every type.
    pub fn zero_value(&self, qualify: &dyn Fn(&ExternalType) -> String) -> String {
        match self {
            Self::Basic(kind) => kind.zero().to_string(),
            Self::Local { name, underlying } => named_zero(name, *underlying),
            Self::External(ext) if ext.path == "unsafe" && ext.name == "Pointer" => {
                "nil".to_string()
            }
            Self::External(ExternalType {
                underlying: Some(underlying),
                ..
            }) => named_zero(&self.render(qualify), *underlying),
            Self::External(_) | Self::Array { .. } | Self::Generic { .. } => {
                format!("{}{{}}", self.render(qualify))
            }
            Self::Literal {
                kind: LiteralKind::Struct,
                ..
            } => format!("{}{{}}", self.render(qualify)),
            Self::TypeParam(name) => format!("*new({name})"),
            Self::Error
            | Self::Universe(_)
            | Self::Pointer(_)
            | Self::Slice(_)
            | Self::Map { .. }
            | Self::Chan { .. }
            | Self::Literal { .. } => "nil".to_string(),
        }
    }

    /// Rewrite references to package-local types as references into the
    /// package at `path`, for use from a file in another package.
    pub fn qualify_locals(&self, path: &str, package_name: &str) -> TypeRef {
        let qualify = |ty: &TypeRef| Box::new(ty.qualify_locals(path, package_name));
        match self {
            Self::Local { name, underlying } => Self::External(ExternalType {
                path: path.to_string(),
                package_name: package_name.to_string(),
                qualifier: package_name.to_string(),
                name: name.clone(),
                underlying: Some(*underlying),
            }),
            Self::Pointer(inner) => Self::Pointer(qualify(inner)),
            Self::Slice(inner) => Self::Slice(qualify(inner)),
            Self::Array { len, elem } => Self::Array {
                len: len.clone(),
                elem: qualify(elem),
            },
            Self::Map { key, value } => Self::Map {
                key: qualify(key),
                value: qualify(value),
            },
            Self::Chan { dir, elem } => Self::Chan {
                dir: *dir,
                elem: qualify(elem),
            },
            Self::Generic { base, args } => Self::Generic {
                base: qualify(base),
                args: args.iter().map(|a| a.qualify_locals(path, package_name)).collect(),
            },
            Self::Literal { kind, segments } => Self::Literal {
                kind: *kind,
                segments: segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Text(text) => Segment::Text(text.clone()),
                        Segment::Type(ty) => Segment::Type(ty.qualify_locals(path, package_name)),
                    })
                    .collect(),
            },
            Self::Basic(_)
            | Self::Error
            | Self::External(_)
            | Self::TypeParam(_)
            | Self::Universe(_) => self.clone(),
        }
    }
}

/// Zero value of a defined type spelled `name` with the given underlying type.
fn named_zero(name: &str, underlying: Underlying) -> String {
    match underlying {
        Underlying::Basic(kind) => format!("{}({})", name, kind.zero()),
        Underlying::Pointer | Underlying::Interface | Underlying::Nilable => {
            format!("{name}(nil)")
        }
        Underlying::Composite | Underlying::Opaque => format!("{name}{{}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_written(ext: &ExternalType) -> String {
        ext.qualifier.clone()
    }

    fn sql_db() -> TypeRef {
        TypeRef::External(ExternalType {
            path: "database/sql".into(),
            package_name: "sql".into(),
            qualifier: "sql".into(),
            name: "DB".into(),
            underlying: None,
        })
    }

    #[test]
    fn test_basic_zero_values() {
        assert_eq!(BasicKind::Bool.zero(), "false");
        assert_eq!(BasicKind::String.zero(), "\"\"");
        assert_eq!(BasicKind::Float64.zero(), "0");
        assert_eq!(BasicKind::from_name("rune"), Some(BasicKind::Rune));
        assert_eq!(BasicKind::from_name("error"), None);
    }

    #[test]
    fn test_render_nested_types() {
        let ty = TypeRef::Map {
            key: Box::new(TypeRef::Basic(BasicKind::String)),
            value: Box::new(TypeRef::Slice(Box::new(TypeRef::Pointer(Box::new(sql_db()))))),
        };
        assert_eq!(ty.render(&as_written), "map[string][]*sql.DB");

        let recv = TypeRef::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(TypeRef::Error),
        };
        assert_eq!(recv.render(&as_written), "<-chan error");
    }

    #[test]
    fn test_render_uses_chosen_qualifier() {
        let renamed = |_: &ExternalType| "sql2".to_string();
        assert_eq!(sql_db().render(&renamed), "sql2.DB");
    }

    #[test]
    fn test_zero_values_by_shape() {
        assert_eq!(sql_db().zero_value(&as_written), "sql.DB{}");
        assert_eq!(TypeRef::Error.zero_value(&as_written), "nil");
        assert_eq!(
            TypeRef::Pointer(Box::new(sql_db())).zero_value(&as_written),
            "nil"
        );

        let mode = TypeRef::Local {
            name: "Mode".into(),
            underlying: Underlying::Basic(BasicKind::Int),
        };
        assert_eq!(mode.zero_value(&as_written), "Mode(0)");

        let opts = TypeRef::Local {
            name: "Options".into(),
            underlying: Underlying::Composite,
        };
        assert_eq!(opts.zero_value(&as_written), "Options{}");

        let handler = TypeRef::Local {
            name: "Handler".into(),
            underlying: Underlying::Nilable,
        };
        assert_eq!(handler.zero_value(&as_written), "Handler(nil)");

        let array = TypeRef::Array {
            len: "4".into(),
            elem: Box::new(TypeRef::Basic(BasicKind::Byte)),
        };
        assert_eq!(array.zero_value(&as_written), "[4]byte{}");
        assert_eq!(TypeRef::TypeParam("K".into()).zero_value(&as_written), "*new(K)");
    }

    #[test]
    fn test_qualify_locals_keeps_zero_value_shape() {
        let mode = TypeRef::Local {
            name: "Mode".into(),
            underlying: Underlying::Basic(BasicKind::Int),
        };
        let slice = TypeRef::Slice(Box::new(mode.clone()));

        let qualified = mode.qualify_locals("example.com/app/pkg", "pkg");
        assert_eq!(qualified.render(&as_written), "pkg.Mode");
        assert_eq!(qualified.zero_value(&as_written), "pkg.Mode(0)");
        assert_eq!(
            slice.qualify_locals("example.com/app/pkg", "pkg").render(&as_written),
            "[]pkg.Mode"
        );
        assert_eq!(sql_db().qualify_locals("example.com/app/pkg", "pkg"), sql_db());
    }

    #[test]
    fn test_for_each_external_walks_literals() {
        let literal = TypeRef::Literal {
            kind: LiteralKind::Func,
            segments: vec![
                Segment::Text("func(".into()),
                Segment::Type(sql_db()),
                Segment::Text(") ".into()),
                Segment::Type(TypeRef::Error),
            ],
        };
        let mut paths = Vec::new();
        literal.for_each_external(&mut |ext| paths.push(ext.path.clone()));
        assert_eq!(paths, vec!["database/sql".to_string()]);
        assert_eq!(literal.render(&as_written), "func(sql.DB) error");
        assert_eq!(literal.zero_value(&as_written), "nil");
    }

    #[test]
    fn test_universal_error_identity() {
        assert!(TypeRef::Error.is_universal_error());
        let shadowed = TypeRef::Local {
            name: "error".into(),
            underlying: Underlying::Composite,
        };
        assert!(!shadowed.is_universal_error());
    }

    #[test]
    fn test_base_name_of_receivers() {
        let ptr = TypeExpr::Pointer(Box::new(TypeExpr::Name("T".into())));
        assert_eq!(ptr.base_name(), Some(("T", true)));
        let generic = TypeExpr::Generic {
            base: Box::new(TypeExpr::Name("List".into())),
            args: vec![TypeExpr::Name("E".into())],
        };
        assert_eq!(generic.base_name(), Some(("List", false)));
        assert_eq!(TypeExpr::Slice(Box::new(TypeExpr::Name("T".into()))).base_name(), None);
    }
}
