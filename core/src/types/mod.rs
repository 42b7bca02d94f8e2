//! file: core/src/types/mod.rs
//! description: source-language types and the type-system query interface.
//!
//! The class hierarchy itself belongs to the front end; the back end only
//! asks it questions through `TypeSystem`. `ClassTable` is the in-memory
//! implementation used by the driver and the tests.

pub mod err;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use err::TypeError;

pub const OBJECT_CLASS: &str = "java.lang.Object";
pub const STRING_CLASS: &str = "java.lang.String";
pub const ENUM_CLASS: &str = "java.lang.Enum";
pub const CLASS_CLASS: &str = "java.lang.Class";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub const NUMERIC: [PrimitiveType; 7] = [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    /// Integral types up to and including `long` (`char` included).
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// `char` is the only unsigned primitive.
    pub fn is_unsigned(self) -> bool {
        self == PrimitiveType::Char
    }

    pub fn bit_width(self) -> u32 {
        match self {
            PrimitiveType::Boolean => 1,
            PrimitiveType::Byte => 8,
            PrimitiveType::Short | PrimitiveType::Char => 16,
            PrimitiveType::Int | PrimitiveType::Float => 32,
            PrimitiveType::Long | PrimitiveType::Double => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(String),
    Array(Box<Type>),
    /// The type of the `null` literal.
    Null,
    Void,
}

impl Type {
    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn long() -> Type {
        Type::Primitive(PrimitiveType::Long)
    }

    pub fn char() -> Type {
        Type::Primitive(PrimitiveType::Char)
    }

    pub fn string() -> Type {
        Type::Class(STRING_CLASS.to_string())
    }

    pub fn class(name: impl Into<String>) -> Type {
        Type::Class(name.into())
    }

    pub fn array_of(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().is_some_and(PrimitiveType::is_numeric)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Boolean))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::Null)
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Rewrite every class name mentioned by this type.
    pub fn map_class_names(&self, f: &dyn Fn(&str) -> Option<String>) -> Type {
        match self {
            Type::Class(name) => match f(name) {
                Some(renamed) => Type::Class(renamed),
                None => self.clone(),
            },
            Type::Array(elem) => Type::Array(Box::new(elem.map_class_names(f))),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p.name()),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Null => write!(f, "null"),
            Type::Void => write!(f, "void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Type>,
    pub ret: Type,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, superclass: Option<&str>) -> Self {
        ClassInfo {
            name: name.into(),
            superclass: superclass.map(str::to_string),
            interfaces: Vec::new(),
            is_interface: false,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, ty: Type, is_static: bool) -> Self {
        self.fields.push(FieldInfo { name: name.to_string(), ty, is_static });
        self
    }

    pub fn with_method(mut self, name: &str, params: Vec<Type>, ret: Type, is_static: bool) -> Self {
        self.methods.push(MethodInfo { name: name.to_string(), params, ret, is_static });
        self
    }
}

/// Members of a class including everything inherited along the superclass
/// chain, nearest declaration first.
#[derive(Debug, Clone, Default)]
pub struct Members {
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

/// Queries the back end needs from the front end's class hierarchy.
pub trait TypeSystem {
    fn type_for_name(&self, name: &str) -> Result<&ClassInfo, TypeError>;

    /// Resolve all members of `name`, forcing resolution of every supertype.
    fn members(&self, name: &str) -> Result<Members, TypeError>;

    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool;

    fn declare_class(&mut self, info: ClassInfo);

    fn is_interface(&self, name: &str) -> bool {
        self.type_for_name(name).map(|c| c.is_interface).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: HashMap<String, ClassInfo>,
}

impl ClassTable {
    pub fn new() -> Self {
        ClassTable { classes: HashMap::new() }
    }

    /// A table preloaded with the core library classes the back end relies
    /// on: the root classes, the exception hierarchy and the runtime support
    /// types.
    pub fn bootstrap() -> Self {
        let mut table = ClassTable::new();
        let object = Some(OBJECT_CLASS);

        table.declare_class(ClassInfo::new(OBJECT_CLASS, None).with_method("<init>", vec![], Type::Void, false));

        let mut string = ClassInfo::new(STRING_CLASS, object)
            .with_method("<init>", vec![Type::array_of(Type::char())], Type::Void, false)
            .with_method("concat", vec![Type::string()], Type::string(), false)
            .with_method("valueOf", vec![Type::class(OBJECT_CLASS)], Type::string(), true);
        for p in PrimitiveType::ALL {
            string = string.with_method("valueOf", vec![Type::Primitive(p)], Type::string(), true);
        }
        table.declare_class(string);

        table.declare_class(
            ClassInfo::new(ENUM_CLASS, object)
                .with_method("<init>", vec![Type::string(), Type::int()], Type::Void, false)
                .with_method("name", vec![], Type::string(), false)
                .with_method("ordinal", vec![], Type::int(), false),
        );
        table.declare_class(ClassInfo::new(CLASS_CLASS, object));

        let hierarchy: [(&str, &str); 9] = [
            ("java.lang.Throwable", OBJECT_CLASS),
            ("java.lang.Exception", "java.lang.Throwable"),
            ("java.lang.Error", "java.lang.Throwable"),
            ("java.lang.RuntimeException", "java.lang.Exception"),
            ("java.lang.ClassCastException", "java.lang.RuntimeException"),
            ("java.lang.NullPointerException", "java.lang.RuntimeException"),
            ("java.lang.IndexOutOfBoundsException", "java.lang.RuntimeException"),
            ("java.lang.ArrayIndexOutOfBoundsException", "java.lang.IndexOutOfBoundsException"),
            ("java.lang.AssertionError", "java.lang.Error"),
        ];
        for (name, sup) in hierarchy {
            table.declare_class(
                ClassInfo::new(name, Some(sup)).with_method("<init>", vec![], Type::Void, false),
            );
        }

        table.declare_class(
            ClassInfo::new("support.Array", object)
                .with_field("length", Type::int(), false)
                .with_method("<init>", vec![Type::int()], Type::Void, false),
        );
        table.declare_class(ClassInfo::new("support.Array$Type", object));
        table.declare_class(
            ClassInfo::new("support.Helper", object)
                .with_method("throwClassCastException", vec![], Type::Void, true),
        );

        table
    }

    pub fn remove_class(&mut self, name: &str) -> Option<ClassInfo> {
        self.classes.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    fn supertypes_of<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut work = vec![name];
        while let Some(cur) = work.pop() {
            if out.contains(&cur) {
                continue;
            }
            out.push(cur);
            if let Some(info) = self.classes.get(cur) {
                if let Some(sup) = info.superclass.as_deref() {
                    work.push(sup);
                }
                work.extend(info.interfaces.iter().map(String::as_str));
            }
        }
        out
    }
}

impl TypeSystem for ClassTable {
    fn type_for_name(&self, name: &str) -> Result<&ClassInfo, TypeError> {
        self.classes.get(name).ok_or_else(|| TypeError::unresolved(name))
    }

    fn members(&self, name: &str) -> Result<Members, TypeError> {
        let mut members = Members::default();
        let mut cur = Some(name.to_string());
        let mut seen: Vec<String> = Vec::new();
        while let Some(class) = cur {
            if seen.contains(&class) {
                return Err(TypeError::circular(&class));
            }
            let info = self.type_for_name(&class)?;
            for iface in &info.interfaces {
                self.type_for_name(iface)?;
            }
            members.fields.extend(info.fields.iter().cloned());
            members.methods.extend(info.methods.iter().cloned());
            seen.push(class);
            cur = info.superclass.clone();
        }
        Ok(members)
    }

    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (Type::Null, t) => t.is_reference(),
            (Type::Class(_) | Type::Array(_), Type::Class(s)) if s == OBJECT_CLASS => true,
            (Type::Class(a), Type::Class(b)) => self.supertypes_of(a).contains(&b.as_str()),
            (Type::Array(a), Type::Array(b)) => {
                a.is_reference() && b.is_reference() && self.is_subtype(a, b)
            }
            _ => false,
        }
    }

    fn declare_class(&mut self, info: ClassInfo) {
        self.classes.insert(info.name.clone(), info);
    }
}
