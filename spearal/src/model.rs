//! Class knowledge for bean decoding and encoding filters.
//!
//! A [`ClassModel`] tells the decoder which properties a class declares,
//! which is what makes partially transmitted beans detectable: a declared
//! property that never arrives is *undefined* rather than silently absent.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexSet;
use smallvec::SmallVec;

/// A class name the model refuses to resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown class {class_name}")]
pub struct UnknownClass {
    pub class_name: Box<str>,
}

/// A class name registered twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("class {class_name} is already registered")]
pub struct DuplicateClass {
    pub class_name: Box<str>,
}

/// What the model knows about a class.
#[derive(Debug, Clone)]
pub enum ClassResolution {
    /// The full declared property set, in declaration order.
    Known(Rc<IndexSet<Rc<str>>>),
    /// Accept the instance as-is, with no declared set.
    Dynamic,
}

/// Resolves the class names attached to a bean.
pub trait ClassModel {
    /// Resolves a bean's class names, primary name first.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownClass`] when none of the names is acceptable;
    /// decoding fails with that error.
    fn resolve(&self, class_names: &[Rc<str>]) -> Result<ClassResolution, UnknownClass>;
}

impl<M: ClassModel + ?Sized> ClassModel for &M {
    fn resolve(&self, class_names: &[Rc<str>]) -> Result<ClassResolution, UnknownClass> {
        (**self).resolve(class_names)
    }
}

/// Accepts every class and declares nothing.
///
/// Beans decode with exactly the properties found on the wire and are
/// never considered partial.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicModel;

impl ClassModel for DynamicModel {
    fn resolve(&self, _class_names: &[Rc<str>]) -> Result<ClassResolution, UnknownClass> {
        Ok(ClassResolution::Dynamic)
    }
}

/// An explicit set of known classes and their declared properties.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: HashMap<Box<str>, Rc<IndexSet<Rc<str>>>>,
    dynamic_fallback: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets unregistered classes decode dynamically instead of failing.
    #[must_use]
    pub fn with_dynamic_fallback(mut self) -> Self {
        self.dynamic_fallback = true;
        self
    }

    /// Registers a class with its declared properties.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateClass`] if the name is already registered.
    pub fn register(
        &mut self,
        class_name: &str,
        properties: &[&str],
    ) -> Result<(), DuplicateClass> {
        if self.classes.contains_key(class_name) {
            return Err(DuplicateClass {
                class_name: class_name.into(),
            });
        }
        let declared = properties.iter().map(|&name| Rc::from(name)).collect();
        self.classes.insert(class_name.into(), Rc::new(declared));
        Ok(())
    }
}

impl ClassModel for Registry {
    fn resolve(&self, class_names: &[Rc<str>]) -> Result<ClassResolution, UnknownClass> {
        for name in class_names {
            if let Some(declared) = self.classes.get(name.as_ref()) {
                return Ok(ClassResolution::Known(Rc::clone(declared)));
            }
        }
        if self.dynamic_fallback {
            Ok(ClassResolution::Dynamic)
        } else {
            Err(UnknownClass {
                class_name: class_names.join(",").into(),
            })
        }
    }
}

/// Limits which bean properties the encoder writes, per class.
///
/// Classes without an entry keep all of their properties. Receivers with
/// a declared set for the class will see the instance as partial.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    classes: HashMap<Box<str>, IndexSet<Box<str>>>,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts a class to the given properties, merging with any
    /// earlier restriction for the same class.
    pub fn add(&mut self, class_name: &str, properties: &[&str]) {
        let selection = self.classes.entry(class_name.into()).or_default();
        selection.extend(properties.iter().map(|&name| Box::from(name)));
    }

    /// The selection for the first class name that has one.
    pub(crate) fn selection(&self, class_names: &[Rc<str>]) -> Option<&IndexSet<Box<str>>> {
        class_names
            .iter()
            .find_map(|name| self.classes.get(name.as_ref()))
    }
}

/// A parsed `Name[,More]#prop1,prop2` descriptor.
#[derive(Debug)]
pub(crate) struct ClassDescriptor {
    pub(crate) class_names: SmallVec<[Rc<str>; 1]>,
    pub(crate) properties: IndexSet<Rc<str>>,
}

/// A malformed class descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DescriptorError {
    #[error("missing the `#` between class names and properties")]
    MissingSeparator,
    #[error("a class name is empty")]
    EmptyClassName,
    #[error("a property name is empty")]
    EmptyPropertyName,
    #[error("a property appears twice")]
    DuplicateProperty,
}

impl ClassDescriptor {
    pub(crate) fn parse(text: &str) -> Result<Self, DescriptorError> {
        let (classes, properties) = text
            .split_once('#')
            .ok_or(DescriptorError::MissingSeparator)?;

        let mut class_names = SmallVec::new();
        for name in classes.split(',') {
            if name.is_empty() {
                return Err(DescriptorError::EmptyClassName);
            }
            class_names.push(Rc::from(name));
        }

        // an empty property part is a class with no properties
        let mut names = IndexSet::new();
        if !properties.is_empty() {
            for name in properties.split(',') {
                if name.is_empty() {
                    return Err(DescriptorError::EmptyPropertyName);
                }
                if !names.insert(Rc::from(name)) {
                    return Err(DescriptorError::DuplicateProperty);
                }
            }
        }

        Ok(Self {
            class_names,
            properties: names,
        })
    }
}

/// Renders the descriptor for a bean's class names and property order.
pub(crate) fn descriptor_text<'a>(
    class_names: &[Rc<str>],
    properties: impl IntoIterator<Item = &'a Rc<str>>,
) -> String {
    let mut text = String::new();
    for (index, name) in class_names.iter().enumerate() {
        if index > 0 {
            text.push(',');
        }
        text.push_str(name);
    }
    text.push('#');
    for (index, name) in properties.into_iter().enumerate() {
        if index > 0 {
            text.push(',');
        }
        text.push_str(name);
    }
    text
}
