use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Dotted address of one (possibly nested) field inside a form model.
///
/// Paths compare, order and hash by their string form, so a path built by a
/// generated lens and one parsed from `"address.city"` are interchangeable map
/// keys. The root of the model is the empty path.
#[derive(Clone)]
pub struct FieldPath(Repr);

#[derive(Clone)]
enum Repr {
    Static(&'static str),
    Shared(Arc<str>),
}

impl FieldPath {
    pub const fn root() -> Self {
        Self(Repr::Static(""))
    }

    pub const fn from_static(path: &'static str) -> Self {
        Self(Repr::Static(path))
    }

    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        if path.is_empty() {
            Self::root()
        } else {
            Self(Repr::Shared(Arc::from(path)))
        }
    }

    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Static(path) => path,
            Repr::Shared(path) => path,
        }
    }

    pub fn is_root(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Appends `child` below this path, e.g. `address` + `city` = `address.city`.
    pub fn join(&self, child: &FieldPath) -> FieldPath {
        if self.is_root() {
            return child.clone();
        }
        if child.is_root() {
            return self.clone();
        }
        Self::new(format!("{}.{}", self.as_str(), child.as_str()))
    }

    pub fn child(&self, segment: &str) -> FieldPath {
        self.join(&FieldPath::new(segment))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.as_str().split('.').filter(|segment| !segment.is_empty())
    }

    /// True when `other` is this path or lies below it. The root contains every path.
    pub fn contains(&self, other: &str) -> bool {
        let prefix = self.as_str();
        if prefix.is_empty() || other == prefix {
            return true;
        }
        other
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldPath").field(&self.as_str()).finish()
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for FieldPath {}

impl PartialEq<str> for FieldPath {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for FieldPath {
    fn from(path: &'static str) -> Self {
        Self::from_static(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

pub trait HasFieldPath {
    fn path(&self) -> FieldPath;
}

impl HasFieldPath for FieldPath {
    fn path(&self) -> FieldPath {
        self.clone()
    }
}

/// Typed accessor for one field of `T`, addressed by [`HasFieldPath::path`].
pub trait FieldLens<T>: HasFieldPath + Clone + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn get<'a>(&self, model: &'a T) -> &'a Self::Value;
    fn get_mut<'a>(&self, model: &'a mut T) -> &'a mut Self::Value;

    fn set(&self, model: &mut T, value: Self::Value) {
        *self.get_mut(model) = value;
    }
}

/// Identity lens; its path is the empty root path.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Root;

impl HasFieldPath for Root {
    fn path(&self) -> FieldPath {
        FieldPath::root()
    }
}

impl<T> FieldLens<T> for Root
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Value = T;

    fn get<'a>(&self, model: &'a T) -> &'a T {
        model
    }

    fn get_mut<'a>(&self, model: &'a mut T) -> &'a mut T {
        model
    }
}

/// `outer` followed by `inner`. The joined path is computed once here.
#[derive(Clone, Debug)]
pub struct Then<A, B> {
    outer: A,
    inner: B,
    path: FieldPath,
}

impl<A, B> Then<A, B>
where
    A: HasFieldPath,
    B: HasFieldPath,
{
    pub fn new(outer: A, inner: B) -> Self {
        let path = outer.path().join(&inner.path());
        Self { outer, inner, path }
    }

    pub fn outer(&self) -> &A {
        &self.outer
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<A, B> HasFieldPath for Then<A, B> {
    fn path(&self) -> FieldPath {
        self.path.clone()
    }
}

impl<T, A, B> FieldLens<T> for Then<A, B>
where
    A: FieldLens<T>,
    B: FieldLens<A::Value>,
{
    type Value = B::Value;

    fn get<'a>(&self, model: &'a T) -> &'a Self::Value {
        self.inner.get(self.outer.get(model))
    }

    fn get_mut<'a>(&self, model: &'a mut T) -> &'a mut Self::Value {
        self.inner.get_mut(self.outer.get_mut(model))
    }
}

/// A record whose fields can be addressed through generated lenses.
///
/// Usually implemented with `#[derive(FormModel)]`; fields marked
/// `#[form(nested)]` expose the nested model's own fields below them.
pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields<P>;

    fn fields_at<P>(parent: P) -> Self::Fields<P>
    where
        P: HasFieldPath + Clone;

    fn fields() -> Self::Fields<Root> {
        Self::fields_at(Root)
    }
}
