//! Static type information consumed by models.
//!
//! Rust has no runtime reflection, so classes describe themselves through the
//! [`Reflect`] and [`ReflectClass`] traits, usually generated by the
//! [`reflect_class!`] macro. For each class this yields the ordered list of its
//! own members with their [`TypeDescriptor`]s, whether a member is optional,
//! type-erased accessors to member values, and the parent class.
//!
//! Inheritance is expressed by composition: a derived class holds its parent
//! in a field, and the reflected parent link knows how to reach that field.
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use xml_model::reflect::{Class, TypeKind};
//! use xml_model::reflect_class;
//!
//! struct Book {
//!     name: String,
//!     nb_pages: f64,
//!     tags: Vec<String>,
//!     isbn: Option<String>,
//! }
//! reflect_class!(Book { name: String, nb_pages: f64, tags: Vec<String>, isbn: Option<String> });
//!
//! let reflected = Class::of::<Book>().reflect();
//! let names: Vec<_> = reflected.own_properties().iter().map(|p| p.name()).collect();
//! assert_eq!(names, ["name", "nb_pages", "tags", "isbn"]);
//!
//! let tags = reflected.property("tags").unwrap();
//! assert!(tags.ty().is(TypeKind::Array));
//! assert!(tags.ty().element_type().unwrap().is(TypeKind::String));
//!
//! let isbn = reflected.property("isbn").unwrap();
//! assert!(isbn.is_optional());
//! assert!(isbn.ty().is(TypeKind::String));
//! ```

use crate::errors::{Error, Result};
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// A type-erased decoded value.
pub type Instance = Box<dyn Any>;

/// Kind of scalar classes, which are leaves of every object graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Text
    String,
    /// Any primitive numeric type
    Number,
    /// `bool`
    Boolean,
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Identity of a class. Two handles are equal when they refer to the same
/// Rust type, whatever their names.
#[derive(Clone, Copy)]
pub struct Class {
    id: TypeId,
    name: &'static str,
    reflect: fn() -> ReflectedClass,
    scalar: Option<ScalarKind>,
}

static REFLECTED: LazyLock<RwLock<HashMap<TypeId, Arc<ReflectedClass>>>> =
    LazyLock::new(Default::default);

impl Class {
    /// Returns the class of `T`.
    pub fn of<T: ReflectClass>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
            reflect: T::reflect_class,
            scalar: T::SCALAR,
        }
    }

    /// Returns the type identifier of the class.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the name of the class.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the scalar kind if this is a scalar class.
    #[inline]
    pub fn scalar(&self) -> Option<ScalarKind> {
        self.scalar
    }

    /// Returns `true` if this is the class of `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns the reflected members of the class. The result is computed once
    /// per class, subsequent calls return the same object.
    pub fn reflect(&self) -> Arc<ReflectedClass> {
        let cached = REFLECTED
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.id)
            .cloned();
        if let Some(reflected) = cached {
            return reflected;
        }
        let reflected = Arc::new((self.reflect)());
        REFLECTED
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(self.id)
            .or_insert(reflected)
            .clone()
    }

    /// Returns the direct parent class.
    pub fn parent(&self) -> Option<Class> {
        self.reflect().parent_class()
    }

    /// Iterates over all parent classes, closest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Class> {
        std::iter::successors(self.parent(), Class::parent)
    }

    /// Views an instance of this class as an instance of `target`, which must
    /// be this class or one of its ancestors. Returns `None` if `object` is not
    /// an instance of this class or `target` is not reachable.
    pub fn upcast<'o>(&self, object: &'o dyn Any, target: &Class) -> Option<&'o dyn Any> {
        if (*object).type_id() != self.id {
            return None;
        }
        let mut class = *self;
        let mut current = object;
        loop {
            if class == *target {
                return Some(current);
            }
            let reflected = class.reflect();
            let parent = reflected.parent.as_ref()?;
            current = (parent.upcast)(current)?;
            class = parent.class;
        }
    }
}

impl PartialEq for Class {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.name)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A type which can be a member of a reflected class.
pub trait Reflect: Any + Sized {
    /// Whether a member of this type may be absent.
    const OPTIONAL: bool = false;

    /// Describes the structure of the type.
    fn type_descriptor() -> TypeDescriptor;

    /// Returns the value as a type-erased reference, or `None` if the value is
    /// absent.
    fn present(&self) -> Option<&dyn Any> {
        Some(self)
    }

    /// Restores a value from a decoded instance.
    fn from_instance(instance: Instance) -> Result<Self> {
        instance
            .downcast::<Self>()
            .map(|value| *value)
            .map_err(|_| Error::Mismatch {
                expected: type_name::<Self>(),
            })
    }

    /// Returns the value of an absent member, or `None` if the type cannot be
    /// absent.
    fn absent() -> Option<Self> {
        None
    }
}

/// A class: a type with a name, reflected members and possibly a parent class.
pub trait ReflectClass: Reflect {
    /// Name of the class
    const NAME: &'static str;
    /// Scalar kind of built-in leaf classes
    const SCALAR: Option<ScalarKind> = None;

    /// Describes the members of the class.
    fn reflect_class() -> ReflectedClass;
}

impl<T: Reflect> Reflect for Option<T> {
    const OPTIONAL: bool = true;

    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }

    fn present(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(Reflect::present)
    }

    fn from_instance(instance: Instance) -> Result<Self> {
        T::from_instance(instance).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Array(ArrayType {
            element: Box::new(T::type_descriptor()),
            items: array_items::<T>,
            collect: collect_array::<T>,
        })
    }
}

fn array_items<T: Reflect>(value: &dyn Any) -> Vec<&dyn Any> {
    match value.downcast_ref::<Vec<T>>() {
        Some(items) => items.iter().filter_map(Reflect::present).collect(),
        None => Vec::new(),
    }
}

fn collect_array<T: Reflect>(items: Vec<Instance>) -> Result<Instance> {
    let items = items
        .into_iter()
        .map(T::from_instance)
        .collect::<Result<Vec<T>>>()?;
    Ok(Box::new(items))
}

macro_rules! impl_scalar {
    ($kind:ident: $($ty:ty),+) => {
        $(
            impl Reflect for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::Class(Class::of::<Self>())
                }
            }

            impl ReflectClass for $ty {
                const NAME: &'static str = stringify!($ty);
                const SCALAR: Option<ScalarKind> = Some(ScalarKind::$kind);

                fn reflect_class() -> ReflectedClass {
                    ReflectedClass::new::<Self>()
                }
            }
        )+
    };
}

impl_scalar!(String: String);
impl_scalar!(Boolean: bool);
impl_scalar!(Number: i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64);

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Kinds of [`TypeDescriptor`] recognized by [`TypeDescriptor::is`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Any class, including scalars
    Class,
    /// Homogeneous sequence
    Array,
    /// Union of several types
    Union,
    /// Single literal value
    Literal,
    /// Anything not described
    Unknown,
    /// The string scalar class
    String,
    /// Any number scalar class
    Number,
    /// The boolean scalar class
    Boolean,
}

/// Structure of a member type.
#[derive(Clone, Debug)]
pub enum TypeDescriptor {
    /// Reference to a class
    Class(Class),
    /// Sequence of values of one type
    Array(ArrayType),
    /// One of several types
    Union(UnionType),
    /// Single literal value
    Literal(Literal),
    /// A type without structural information
    Unknown,
}

impl TypeDescriptor {
    /// Describes a union of the literals of `U`.
    pub fn literal_union<U: LiteralUnion>() -> Self {
        Self::Union(UnionType {
            types: U::literals().into_iter().map(Self::Literal).collect(),
            bridge: Some(LiteralBridge {
                to_literal: literal_of::<U>,
                from_literal: instance_of::<U>,
            }),
        })
    }

    /// Returns the kind of the descriptor.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Class(_) => TypeKind::Class,
            Self::Array(_) => TypeKind::Array,
            Self::Union(_) => TypeKind::Union,
            Self::Literal(_) => TypeKind::Literal,
            Self::Unknown => TypeKind::Unknown,
        }
    }

    /// Checks the kind of the descriptor. Scalar kinds match classes of the
    /// corresponding scalar.
    pub fn is(&self, kind: TypeKind) -> bool {
        let scalar = match kind {
            TypeKind::String => ScalarKind::String,
            TypeKind::Number => ScalarKind::Number,
            TypeKind::Boolean => ScalarKind::Boolean,
            kind => return self.kind() == kind,
        };
        matches!(self, Self::Class(class) if class.scalar() == Some(scalar))
    }

    /// Returns the referenced class of a class descriptor.
    pub fn class(&self) -> Option<Class> {
        match self {
            Self::Class(class) => Some(*class),
            _ => None,
        }
    }

    /// Returns the element type of an array descriptor.
    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Array(array) => Some(&array.element),
            _ => None,
        }
    }

    /// Returns the alternatives of a union descriptor.
    pub fn types(&self) -> Option<&[TypeDescriptor]> {
        match self {
            Self::Union(union) => Some(&union.types),
            _ => None,
        }
    }

    /// Returns the value of a literal descriptor.
    pub fn value(&self) -> Option<&Literal> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Returns `true` if this describes exactly `class`.
    pub fn is_class(&self, class: &Class) -> bool {
        self.class().as_ref() == Some(class)
    }

    /// Returns the common scalar class of a union of literals, if all its
    /// alternatives are literals of the same scalar.
    pub fn literal_class(&self) -> Option<Class> {
        let types = self.types()?;
        let mut classes = types.iter().map(|ty| ty.value().map(Literal::class));
        let first = classes.next()??;
        classes
            .all(|class| class == Some(first))
            .then_some(first)
    }
}

/// Descriptor of `Vec<T>` with type-erased access to its items.
#[derive(Clone)]
pub struct ArrayType {
    element: Box<TypeDescriptor>,
    items: fn(&dyn Any) -> Vec<&dyn Any>,
    collect: fn(Vec<Instance>) -> Result<Instance>,
}

impl ArrayType {
    /// Returns the element type.
    pub fn element(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Returns present items of an array value.
    pub fn items<'v>(&self, value: &'v dyn Any) -> Vec<&'v dyn Any> {
        (self.items)(value)
    }

    /// Collects decoded items into an array value.
    pub fn collect(&self, items: Vec<Instance>) -> Result<Instance> {
        (self.collect)(items)
    }
}

impl fmt::Debug for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Array").field(&self.element).finish()
    }
}

/// Descriptor of a union.
#[derive(Clone)]
pub struct UnionType {
    types: Vec<TypeDescriptor>,
    bridge: Option<LiteralBridge>,
}

impl UnionType {
    /// Returns the alternatives.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Returns conversions between the union type and its literals, present
    /// for unions of literals.
    pub fn bridge(&self) -> Option<&LiteralBridge> {
        self.bridge.as_ref()
    }
}

impl fmt::Debug for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Union").field(&self.types).finish()
    }
}

/// Conversions between values of a literal union and their literals.
#[derive(Clone, Copy)]
pub struct LiteralBridge {
    to_literal: fn(&dyn Any) -> Option<Literal>,
    from_literal: fn(&Literal) -> Option<Instance>,
}

impl LiteralBridge {
    /// Returns the literal of a union value.
    pub fn to_literal(&self, value: &dyn Any) -> Option<Literal> {
        (self.to_literal)(value)
    }

    /// Returns the union value of a literal, if the literal belongs to the union.
    pub fn from_literal(&self, literal: &Literal) -> Option<Instance> {
        (self.from_literal)(literal)
    }
}

fn literal_of<U: LiteralUnion>(value: &dyn Any) -> Option<Literal> {
    value.downcast_ref::<U>().map(U::to_literal)
}

fn instance_of<U: LiteralUnion>(literal: &Literal) -> Option<Instance> {
    U::from_literal(literal).map(|value| Box::new(value) as Instance)
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A literal value of a scalar type.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// String literal
    String(Cow<'static, str>),
    /// Number literal
    Number(f64),
    /// Boolean literal
    Boolean(bool),
}

impl Literal {
    /// Returns the scalar class of the literal. Numbers are represented by `f64`.
    pub fn class(&self) -> Class {
        match self {
            Self::String(_) => Class::of::<String>(),
            Self::Number(_) => Class::of::<f64>(),
            Self::Boolean(_) => Class::of::<bool>(),
        }
    }

    /// Converts the literal into an instance of its scalar class.
    pub fn to_instance(&self) -> Instance {
        match self {
            Self::String(s) => Box::new(s.to_string()),
            Self::Number(n) => Box::new(*n),
            Self::Boolean(b) => Box::new(*b),
        }
    }

    /// Converts an instance of a scalar class back into a literal.
    pub fn from_instance(value: &dyn Any) -> Option<Self> {
        if let Some(s) = value.downcast_ref::<String>() {
            return Some(Self::String(Cow::Owned(s.clone())));
        }
        if let Some(n) = value.downcast_ref::<f64>() {
            return Some(Self::Number(*n));
        }
        value.downcast_ref::<bool>().map(|b| Self::Boolean(*b))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => n.fmt(f),
            Self::Boolean(b) => b.fmt(f),
        }
    }
}

impl From<&'static str> for Literal {
    fn from(value: &'static str) -> Self {
        Self::String(Cow::Borrowed(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A type whose values are a closed set of literals, usually declared with the
/// [`literal_union!`] macro.
pub trait LiteralUnion: Reflect {
    /// Returns all literals in declaration order.
    fn literals() -> Vec<Literal>;

    /// Returns the literal of the value.
    fn to_literal(&self) -> Literal;

    /// Returns the value of a literal, or `None` if it does not belong to the union.
    fn from_literal(literal: &Literal) -> Option<Self>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Parent link of a reflected class.
#[derive(Clone, Copy)]
struct ParentClass {
    class: Class,
    upcast: fn(&dyn Any) -> Option<&dyn Any>,
}

/// Reflected members and parent of a class.
pub struct ReflectedClass {
    class: Class,
    parent: Option<ParentClass>,
    properties: Vec<ReflectedProperty>,
}

impl ReflectedClass {
    /// Describes a class without members and parent.
    pub fn new<T: ReflectClass>() -> Self {
        Self {
            class: Class::of::<T>(),
            parent: None,
            properties: Vec::new(),
        }
    }

    /// Sets the parent class. `upcast` views an instance of this class as an
    /// instance of `P`.
    pub fn with_parent<P: ReflectClass>(mut self, upcast: fn(&dyn Any) -> Option<&dyn Any>) -> Self {
        self.parent = Some(ParentClass {
            class: Class::of::<P>(),
            upcast,
        });
        self
    }

    /// Appends an own member.
    pub fn with_property(mut self, property: ReflectedProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the described class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the parent class.
    pub fn parent_class(&self) -> Option<Class> {
        self.parent.map(|parent| parent.class)
    }

    /// Returns own members in declaration order, methods included.
    pub fn own_properties(&self) -> &[ReflectedProperty] {
        &self.properties
    }

    /// Finds a member by name among own members, then among inherited ones.
    pub fn property(&self, name: &str) -> Option<ReflectedProperty> {
        if let Some(property) = self.properties.iter().find(|p| p.name == name) {
            return Some(property.clone());
        }
        self.parent_class()?.reflect().property(name)
    }
}

impl fmt::Debug for ReflectedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectedClass")
            .field("class", &self.class)
            .field("parent", &self.parent_class())
            .field("properties", &self.properties)
            .finish()
    }
}

/// Kind of a class member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    /// Data member which takes part in conversions
    Field,
    /// Method, never converted
    Method,
}

type Accessor = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;

fn accessor<F>(get: F) -> Accessor
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync + 'static,
{
    Arc::new(get)
}

/// A reflected member of a class.
#[derive(Clone)]
pub struct ReflectedProperty {
    name: &'static str,
    host: Class,
    ty: TypeDescriptor,
    optional: bool,
    kind: MemberKind,
    accessor: Option<Accessor>,
}

impl ReflectedProperty {
    /// Describes a data member of `H` of type `F`.
    pub fn field<H, F>(name: &'static str, get: fn(&H) -> &F) -> Self
    where
        H: ReflectClass,
        F: Reflect,
    {
        Self {
            name,
            host: Class::of::<H>(),
            ty: F::type_descriptor(),
            optional: F::OPTIONAL,
            kind: MemberKind::Field,
            accessor: Some(accessor(move |object| {
                object.downcast_ref::<H>().and_then(|host| get(host).present())
            })),
        }
    }

    /// Describes a method of `H`.
    pub fn method<H: ReflectClass>(name: &'static str) -> Self {
        Self {
            name,
            host: Class::of::<H>(),
            ty: TypeDescriptor::Unknown,
            optional: false,
            kind: MemberKind::Method,
            accessor: None,
        }
    }

    /// Returns the member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the class which declares the member.
    #[inline]
    pub fn host(&self) -> Class {
        self.host
    }

    /// Returns the member type.
    #[inline]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Returns `true` if the member may be absent.
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the member kind.
    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Returns `true` if the member is a method.
    #[inline]
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// Reads the member of an instance of the host class. Returns `None` if the
    /// value is absent.
    pub fn get<'o>(&self, object: &'o dyn Any) -> Result<Option<&'o dyn Any>> {
        if (*object).type_id() != self.host.id() {
            return Err(Error::Mismatch {
                expected: self.host.name(),
            });
        }
        Ok(self.accessor.as_ref().and_then(|get| get(object)))
    }
}

impl fmt::Debug for ReflectedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectedProperty")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("ty", &self.ty)
            .field("optional", &self.optional)
            .field("kind", &self.kind)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Implements [`Reflect`] and [`ReflectClass`] for a struct.
///
/// Lists data members with their types, optionally followed by method names
/// after `;`. A derived class names its parent type and the field holding the
/// parent instance.
///
/// ```
/// use xml_model::reflect::Class;
/// use xml_model::reflect_class;
///
/// #[derive(Default)]
/// struct B {
///     prop_a: f64,
/// }
/// reflect_class!(B { prop_a: f64 });
///
/// #[derive(Default)]
/// struct C {
///     base: B,
///     prop_b: f64,
/// }
/// impl C {
///     fn describe(&self) -> String {
///         format!("{}/{}", self.base.prop_a, self.prop_b)
///     }
/// }
/// reflect_class!(C: B as base { prop_b: f64; describe });
///
/// assert_eq!(Class::of::<C>().parent(), Some(Class::of::<B>()));
/// assert!(Class::of::<C>().reflect().property("prop_a").is_some());
/// assert!(Class::of::<C>().reflect().property("describe").unwrap().is_method());
/// ```
#[macro_export]
macro_rules! reflect_class {
    (
        $name:ident $(: $parent:ident as $base:ident)? {
            $($field:ident : $ty:ty),* $(,)?
            $(; $($method:ident),* $(,)?)?
        }
    ) => {
        impl $crate::reflect::Reflect for $name {
            fn type_descriptor() -> $crate::reflect::TypeDescriptor {
                $crate::reflect::TypeDescriptor::Class($crate::reflect::Class::of::<Self>())
            }
        }

        impl $crate::reflect::ReflectClass for $name {
            const NAME: &'static str = stringify!($name);

            fn reflect_class() -> $crate::reflect::ReflectedClass {
                $crate::reflect::ReflectedClass::new::<Self>()
                    $(
                        .with_parent::<$parent>(|object| {
                            object
                                .downcast_ref::<Self>()
                                .map(|this| &this.$base as &dyn ::std::any::Any)
                        })
                    )?
                    $(
                        .with_property($crate::reflect::ReflectedProperty::field::<Self, $ty>(
                            stringify!($field),
                            |this| &this.$field,
                        ))
                    )*
                    $($(
                        .with_property($crate::reflect::ReflectedProperty::method::<Self>(
                            stringify!($method),
                        ))
                    )*)?
            }
        }
    };
}

/// Declares a field-less enum whose variants stand for literals of one scalar
/// type, and implements [`LiteralUnion`] and [`Reflect`] for it.
///
/// ```
/// use xml_model::literal_union;
/// use xml_model::reflect::{Class, LiteralUnion, Literal, Reflect};
///
/// literal_union! {
///     #[derive(Clone, Copy, Debug, PartialEq)]
///     pub enum Bit {
///         Zero = 0,
///         One = 1,
///     }
/// }
///
/// assert_eq!(Bit::One.to_literal(), Literal::Number(1.0));
/// assert_eq!(Bit::from_literal(&Literal::Number(0.0)), Some(Bit::Zero));
/// assert_eq!(Bit::type_descriptor().literal_class(), Some(Class::of::<f64>()));
/// ```
#[macro_export]
macro_rules! literal_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant),+
        }

        impl $crate::reflect::LiteralUnion for $name {
            fn literals() -> ::std::vec::Vec<$crate::reflect::Literal> {
                ::std::vec![$($crate::reflect::Literal::from($value)),+]
            }

            fn to_literal(&self) -> $crate::reflect::Literal {
                match self {
                    $(Self::$variant => $crate::reflect::Literal::from($value)),+
                }
            }

            fn from_literal(literal: &$crate::reflect::Literal) -> ::std::option::Option<Self> {
                $(
                    if *literal == $crate::reflect::Literal::from($value) {
                        return ::std::option::Option::Some(Self::$variant);
                    }
                )+
                ::std::option::Option::None
            }
        }

        impl $crate::reflect::Reflect for $name {
            fn type_descriptor() -> $crate::reflect::TypeDescriptor {
                $crate::reflect::TypeDescriptor::literal_union::<Self>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Point {
        x: f64,
        label: Option<String>,
    }
    reflect_class!(Point { x: f64, label: Option<String> });

    struct Point3 {
        point: Point,
        z: f64,
    }
    reflect_class!(Point3: Point as point { z: f64 });

    literal_union! {
        #[derive(Debug, PartialEq)]
        enum Side {
            Left = "left",
            Right = "right",
        }
    }

    #[test]
    fn reflect_is_cached() {
        let first = Class::of::<Point>().reflect();
        let second = Class::of::<Point>().reflect();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn identity() {
        assert_eq!(Class::of::<Point>(), Class::of::<Point>());
        assert_ne!(Class::of::<Point>(), Class::of::<Point3>());
        assert!(Class::of::<Point>().is::<Point>());
        assert_eq!(Class::of::<Point3>().name(), "Point3");
        assert_eq!(Class::of::<u8>().scalar(), Some(ScalarKind::Number));
    }

    #[test]
    fn accessors() {
        let point = Point { x: 1.5, label: None };
        let reflected = Class::of::<Point>().reflect();

        let x = reflected.property("x").unwrap();
        let value = x.get(&point).unwrap().unwrap();
        assert_eq!(value.downcast_ref::<f64>(), Some(&1.5));

        let label = reflected.property("label").unwrap();
        assert!(label.is_optional());
        assert!(label.get(&point).unwrap().is_none());

        assert!(matches!(
            x.get(&"not a point".to_string()),
            Err(Error::Mismatch { expected: "Point" })
        ));
    }

    #[test]
    fn inheritance() {
        let point = Point3 {
            point: Point {
                x: 2.0,
                label: Some("p".into()),
            },
            z: 3.0,
        };
        let class = Class::of::<Point3>();
        assert_eq!(class.ancestors().collect::<Vec<_>>(), [Class::of::<Point>()]);

        let own: Vec<_> = class.reflect().own_properties().iter().map(|p| p.name()).collect();
        assert_eq!(own, ["z"]);

        let inherited = class.reflect().property("x").unwrap();
        assert_eq!(inherited.host(), Class::of::<Point>());

        let base = class.upcast(&point, &Class::of::<Point>()).unwrap();
        let x = inherited.get(base).unwrap().unwrap();
        assert_eq!(x.downcast_ref::<f64>(), Some(&2.0));

        assert!(class.upcast(&point, &Class::of::<String>()).is_none());
        assert!(Class::of::<Point>().upcast(&point, &Class::of::<Point>()).is_none());
    }

    #[test]
    fn descriptors() {
        assert!(f64::type_descriptor().is(TypeKind::Number));
        assert!(f64::type_descriptor().is(TypeKind::Class));
        assert!(!f64::type_descriptor().is(TypeKind::String));
        assert!(String::type_descriptor().is(TypeKind::String));
        assert!(bool::type_descriptor().is(TypeKind::Boolean));

        let points = Vec::<Point>::type_descriptor();
        assert!(points.is(TypeKind::Array));
        assert!(points.element_type().unwrap().is_class(&Class::of::<Point>()));

        let side = Side::type_descriptor();
        assert!(side.is(TypeKind::Union));
        assert_eq!(side.types().unwrap().len(), 2);
        assert_eq!(side.literal_class(), Some(Class::of::<String>()));
    }

    #[test]
    fn mixed_literals_have_no_class() {
        let mixed = TypeDescriptor::Union(UnionType {
            types: vec![
                TypeDescriptor::Literal(Literal::from(1)),
                TypeDescriptor::Literal(Literal::from("one")),
            ],
            bridge: None,
        });
        assert_eq!(mixed.literal_class(), None);
        assert_eq!(TypeDescriptor::Unknown.literal_class(), None);
    }

    #[test]
    fn array_items_and_collect() {
        let ty = Vec::<Option<f64>>::type_descriptor();
        let TypeDescriptor::Array(array) = &ty else {
            panic!("expected array, got {:?}", ty);
        };
        let value = vec![Some(1.0), None, Some(3.0)];
        assert_eq!(array.items(&value).len(), 2);

        let collected = array
            .collect(vec![Box::new(1.0_f64), Box::new(2.0_f64)])
            .unwrap();
        assert_eq!(
            collected.downcast_ref::<Vec<Option<f64>>>(),
            Some(&vec![Some(1.0), Some(2.0)])
        );

        assert!(array.collect(vec![Box::new("x".to_string())]).is_err());
    }

    #[test]
    fn literal_bridge() {
        let ty = Side::type_descriptor();
        let TypeDescriptor::Union(union) = &ty else {
            panic!("expected union, got {:?}", ty);
        };
        let bridge = union.bridge().unwrap();

        let literal = bridge.to_literal(&Side::Right).unwrap();
        assert_eq!(literal, Literal::from("right"));

        let instance = bridge.from_literal(&Literal::from("left")).unwrap();
        assert_eq!(instance.downcast_ref::<Side>(), Some(&Side::Left));
        assert!(bridge.from_literal(&Literal::from("up")).is_none());
    }
}
