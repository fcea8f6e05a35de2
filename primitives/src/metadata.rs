//! Static descriptions of pallet types, consumed by documentation tooling.

/// Shape of a described type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Struct { fields: Vec<&'static str> },
    Enum { variants: Vec<&'static str> },
}

/// Description of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Module path, e.g. `pallet_author_inherent::pallet`.
    pub path: &'static str,
    pub name: &'static str,
    /// Whether the Rust type takes the pallet configuration as a type
    /// parameter.
    pub generic: bool,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Crate the type lives in, the first segment of its path.
    pub fn crate_name(&self) -> &'static str {
        self.path.split("::").next().unwrap_or(self.path)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }
}

/// Types able to describe themselves.
pub trait TypeInfo {
    fn type_info() -> TypeDescriptor;
}
