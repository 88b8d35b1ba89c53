use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use super::data::ErrorMessage;
use super::path::{FieldLens, FieldPath};

/// The event a validator is attached to. [`Trigger::ALL`] is also the
/// precedence order used when every validator of a field runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Trigger {
    OnChange,
    OnBlur,
    OnSubmit,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [Trigger::OnChange, Trigger::OnBlur, Trigger::OnSubmit];
}

/// A value that is either available now or produced by a future.
pub enum Outcome<T> {
    Ready(T),
    Pending(BoxFuture<'static, T>),
}

impl<T> Outcome<T>
where
    T: Send + 'static,
{
    pub fn pending(future: impl Future<Output = T> + Send + 'static) -> Self {
        Self::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub async fn resolve(self) -> T {
        match self {
            Self::Ready(value) => value,
            Self::Pending(future) => future.await,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Self::Ready(value) => Outcome::Ready(f(value)),
            Self::Pending(future) => Outcome::Pending(future.map(f).boxed()),
        }
    }
}

impl<T: Debug> Debug for Outcome<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Result of one validator call: `None` means valid.
pub type Validation = Outcome<Option<ErrorMessage>>;

impl<M> From<Option<M>> for Validation
where
    M: Into<ErrorMessage>,
{
    fn from(value: Option<M>) -> Self {
        Outcome::Ready(value.map(Into::into))
    }
}

pub type Validator<F> = Arc<dyn Fn(&F) -> Validation + Send + Sync>;

/// Up to one validator per [`Trigger`] for a single field.
pub struct FieldValidation<F> {
    on_change: Option<Validator<F>>,
    on_blur: Option<Validator<F>>,
    on_submit: Option<Validator<F>>,
}

impl<F> Clone for FieldValidation<F> {
    fn clone(&self) -> Self {
        Self {
            on_change: self.on_change.clone(),
            on_blur: self.on_blur.clone(),
            on_submit: self.on_submit.clone(),
        }
    }
}

impl<F> Default for FieldValidation<F> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_blur: None,
            on_submit: None,
        }
    }
}

impl<F> Debug for FieldValidation<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValidation")
            .field("on_change", &self.on_change.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

impl<F: 'static> FieldValidation<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change<R>(self, validator: impl Fn(&F) -> R + Send + Sync + 'static) -> Self
    where
        R: Into<Validation>,
    {
        self.validate_with(Trigger::OnChange, validator)
    }

    pub fn on_blur<R>(self, validator: impl Fn(&F) -> R + Send + Sync + 'static) -> Self
    where
        R: Into<Validation>,
    {
        self.validate_with(Trigger::OnBlur, validator)
    }

    pub fn on_submit<R>(self, validator: impl Fn(&F) -> R + Send + Sync + 'static) -> Self
    where
        R: Into<Validation>,
    {
        self.validate_with(Trigger::OnSubmit, validator)
    }

    pub fn on_change_async<Fut>(self, validator: impl Fn(&F) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Option<ErrorMessage>> + Send + 'static,
    {
        self.validate_with_async(Trigger::OnChange, validator)
    }

    pub fn on_blur_async<Fut>(self, validator: impl Fn(&F) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Option<ErrorMessage>> + Send + 'static,
    {
        self.validate_with_async(Trigger::OnBlur, validator)
    }

    pub fn on_submit_async<Fut>(self, validator: impl Fn(&F) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Option<ErrorMessage>> + Send + 'static,
    {
        self.validate_with_async(Trigger::OnSubmit, validator)
    }

    pub fn validate_with<R>(
        mut self,
        trigger: Trigger,
        validator: impl Fn(&F) -> R + Send + Sync + 'static,
    ) -> Self
    where
        R: Into<Validation>,
    {
        *self.slot_mut(trigger) =
            Some(Arc::new(move |value: &F| -> Validation { validator(value).into() }));
        self
    }

    pub fn validate_with_async<Fut>(
        mut self,
        trigger: Trigger,
        validator: impl Fn(&F) -> Fut + Send + Sync + 'static,
    ) -> Self
    where
        Fut: Future<Output = Option<ErrorMessage>> + Send + 'static,
    {
        *self.slot_mut(trigger) = Some(Arc::new(move |value: &F| -> Validation {
            Outcome::Pending(validator(value).boxed())
        }));
        self
    }

    pub fn get(&self, trigger: Trigger) -> Option<&Validator<F>> {
        match trigger {
            Trigger::OnChange => self.on_change.as_ref(),
            Trigger::OnBlur => self.on_blur.as_ref(),
            Trigger::OnSubmit => self.on_submit.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Trigger::ALL.iter().all(|trigger| self.get(*trigger).is_none())
    }

    fn slot_mut(&mut self, trigger: Trigger) -> &mut Option<Validator<F>> {
        match trigger {
            Trigger::OnChange => &mut self.on_change,
            Trigger::OnBlur => &mut self.on_blur,
            Trigger::OnSubmit => &mut self.on_submit,
        }
    }

    /// Slots set in `other` replace the ones in `self`.
    fn merge(&mut self, mut other: Self) {
        for trigger in Trigger::ALL {
            if let Some(validator) = other.slot_mut(trigger).take() {
                *self.slot_mut(trigger) = Some(validator);
            }
        }
    }

    /// Re-targets the validators at the field `lens` reads from a `T`.
    fn lift<T, L>(self, lens: L) -> FieldValidation<T>
    where
        T: 'static,
        L: FieldLens<T, Value = F>,
    {
        let lift_slot = |slot: Option<Validator<F>>| {
            slot.map(|validator| {
                let lens = lens.clone();
                Arc::new(move |model: &T| validator(lens.get(model))) as Validator<T>
            })
        };
        FieldValidation {
            on_change: lift_slot(self.on_change),
            on_blur: lift_slot(self.on_blur),
            on_submit: lift_slot(self.on_submit),
        }
    }
}

/// Declarative validation tree mirroring the shape of `V`.
///
/// A node can carry validators for its whole value (`field`) and for values
/// below it (`nested`) at the same time.
pub struct FormValidation<V> {
    nodes: BTreeMap<FieldPath, ValidationNode<V>>,
}

struct ValidationNode<V> {
    own: FieldValidation<V>,
    children: FormValidation<V>,
}

impl<V> Default for FormValidation<V> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<V> Default for ValidationNode<V> {
    fn default() -> Self {
        Self {
            own: FieldValidation::default(),
            children: FormValidation::default(),
        }
    }
}

impl<V: 'static> FormValidation<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<L>(mut self, lens: L, validation: FieldValidation<L::Value>) -> Self
    where
        L: FieldLens<V>,
    {
        let node = self.nodes.entry(lens.path()).or_default();
        node.own.merge(validation.lift(lens));
        self
    }

    pub fn nested<L>(mut self, lens: L, children: FormValidation<L::Value>) -> Self
    where
        L: FieldLens<V>,
    {
        let lifted = children.lift(lens.clone());
        let node = self.nodes.entry(lens.path()).or_default();
        node.children.absorb(lifted);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flattens the tree into one entry per dotted path.
    pub fn flatten(&self) -> FieldValidators<V> {
        let mut by_path = BTreeMap::new();
        self.flatten_into(&FieldPath::root(), &mut by_path);
        FieldValidators { by_path }
    }

    fn flatten_into(&self, prefix: &FieldPath, out: &mut BTreeMap<FieldPath, FieldValidation<V>>) {
        for (segment, node) in &self.nodes {
            let path = prefix.join(segment);
            if !node.own.is_empty() {
                out.entry(path.clone())
                    .or_default()
                    .merge(node.own.clone());
            }
            node.children.flatten_into(&path, out);
        }
    }

    fn lift<T, L>(self, lens: L) -> FormValidation<T>
    where
        T: 'static,
        L: FieldLens<T, Value = V>,
    {
        let nodes = self
            .nodes
            .into_iter()
            .map(|(path, node)| {
                let node = ValidationNode {
                    own: node.own.lift(lens.clone()),
                    children: node.children.lift(lens.clone()),
                };
                (path, node)
            })
            .collect();
        FormValidation { nodes }
    }

    fn absorb(&mut self, other: Self) {
        for (path, node) in other.nodes {
            let entry = self.nodes.entry(path).or_default();
            entry.own.merge(node.own);
            entry.children.absorb(node.children);
        }
    }
}

/// Flat registry: dotted path to the validators of that field, each one
/// reading its value from the root model `V`.
pub struct FieldValidators<V> {
    by_path: BTreeMap<FieldPath, FieldValidation<V>>,
}

impl<V> Clone for FieldValidators<V> {
    fn clone(&self) -> Self {
        Self {
            by_path: self.by_path.clone(),
        }
    }
}

impl<V> Default for FieldValidators<V> {
    fn default() -> Self {
        Self {
            by_path: BTreeMap::new(),
        }
    }
}

impl<V> Debug for FieldValidators<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.by_path.iter()).finish()
    }
}

impl<V> FieldValidators<V> {
    pub fn get(&self, path: &str) -> Option<&FieldValidation<V>> {
        self.by_path.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldValidation<V>)> {
        self.by_path.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.by_path.keys()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
