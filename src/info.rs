//! Normalizes raw decorator applications into [`DecoratorInfo`] records.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DecorError, DecorResult};
use crate::target::Target;

/// The kind of element a decorator is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// The class itself
    Class,
    /// A method
    Method,
    /// A property
    Property,
    /// A method parameter
    Parameter,
}

impl ElementKind {
    /// All element kinds.
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Class,
        ElementKind::Method,
        ElementKind::Property,
        ElementKind::Parameter,
    ];

    /// Whether the kind addresses a member rather than the class.
    pub fn is_member(self) -> bool {
        self != ElementKind::Class
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Class => "class",
            ElementKind::Method => "method",
            ElementKind::Property => "property",
            ElementKind::Parameter => "parameter",
        };
        f.write_str(name)
    }
}

/// An opaque declared-type hint.
///
/// Hints are passed through to decorator callbacks untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHint {
    id: TypeId,
    name: &'static str,
}

impl TypeHint {
    /// Hint naming the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type id of the hinted type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name of the hinted type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the hint names `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHint({})", self.name)
    }
}

/// Source of declared-type hints for class members.
pub trait TypeHintSource {
    /// Declared type of a member (property type, or the method itself).
    fn declared_type(&self, target: &Target, member: &str) -> Option<TypeHint>;

    /// Return type of a method.
    fn return_type(&self, target: &Target, member: &str) -> Option<TypeHint>;

    /// Parameter types of a method, in order.
    fn parameter_types(&self, target: &Target, member: &str) -> Option<Vec<TypeHint>>;
}

/// A source that knows no hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypeHints;

impl TypeHintSource for NoTypeHints {
    fn declared_type(&self, _target: &Target, _member: &str) -> Option<TypeHint> {
        None
    }

    fn return_type(&self, _target: &Target, _member: &str) -> Option<TypeHint> {
        None
    }

    fn parameter_types(&self, _target: &Target, _member: &str) -> Option<Vec<TypeHint>> {
        None
    }
}

#[derive(Debug, Clone, Default)]
struct MemberHints {
    declared: Option<TypeHint>,
    returns: Option<TypeHint>,
    parameters: Option<Vec<TypeHint>>,
}

/// In-memory table of type hints keyed by target and member.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Class, Target, TypeHint, TypeHintSource, TypeHints};
///
/// struct Service;
/// impl Class for Service {}
///
/// let target = Target::of::<Service>();
/// let mut hints = TypeHints::new();
/// let params = vec![TypeHint::of::<String>(), TypeHint::of::<u32>()];
/// hints.set_parameter_types(&target, "handle", params);
///
/// let params = hints.parameter_types(&target, "handle").unwrap();
/// assert!(params[1].is::<u32>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeHints {
    members: HashMap<(Target, String), MemberHints>,
}

impl TypeHints {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, target: &Target, member: &str) -> &mut MemberHints {
        self.members.entry((*target, member.to_string())).or_default()
    }

    /// Records the declared type of a member.
    pub fn set_type(&mut self, target: &Target, member: &str, hint: TypeHint) -> &mut Self {
        self.entry(target, member).declared = Some(hint);
        self
    }

    /// Records the return type of a method.
    pub fn set_return_type(&mut self, target: &Target, member: &str, hint: TypeHint) -> &mut Self {
        self.entry(target, member).returns = Some(hint);
        self
    }

    /// Records the parameter types of a method.
    pub fn set_parameter_types(
        &mut self,
        target: &Target,
        member: &str,
        hints: Vec<TypeHint>,
    ) -> &mut Self {
        self.entry(target, member).parameters = Some(hints);
        self
    }

    fn get(&self, target: &Target, member: &str) -> Option<&MemberHints> {
        self.members.get(&(*target, member.to_string()))
    }
}

impl TypeHintSource for TypeHints {
    fn declared_type(&self, target: &Target, member: &str) -> Option<TypeHint> {
        self.get(target, member)?.declared
    }

    fn return_type(&self, target: &Target, member: &str) -> Option<TypeHint> {
        self.get(target, member)?.returns
    }

    fn parameter_types(&self, target: &Target, member: &str) -> Option<Vec<TypeHint>> {
        self.get(target, member)?.parameters.clone()
    }
}

/// A raw decorator application as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Element the decorator is attached to
    pub kind: ElementKind,
    /// Owning class
    pub target: Target,
    /// Member name, present for every kind except [`ElementKind::Class`]
    pub member: Option<String>,
    /// Parameter position, present only for [`ElementKind::Parameter`]
    pub index: Option<usize>,
}

impl Application {
    /// Application on the class itself.
    pub fn class(target: Target) -> Self {
        Self {
            kind: ElementKind::Class,
            target,
            member: None,
            index: None,
        }
    }

    /// Application on a method.
    pub fn method(target: Target, member: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Method,
            target,
            member: Some(member.into()),
            index: None,
        }
    }

    /// Application on a property.
    pub fn property(target: Target, member: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Property,
            target,
            member: Some(member.into()),
            index: None,
        }
    }

    /// Application on parameter `index` of method `member`.
    pub fn parameter(target: Target, member: impl Into<String>, index: usize) -> Self {
        Self {
            kind: ElementKind::Parameter,
            target,
            member: Some(member.into()),
            index: Some(index),
        }
    }

    fn validate(&self) -> DecorResult<()> {
        match (self.kind, &self.member, self.index) {
            (ElementKind::Class, None, None) => Ok(()),
            (ElementKind::Class, _, _) => {
                Err(DecorError::InvalidApplication("class application with a member"))
            }
            (_, None, _) => {
                Err(DecorError::InvalidApplication("member application without a name"))
            }
            (ElementKind::Parameter, Some(_), None) => {
                Err(DecorError::InvalidApplication("parameter application without an index"))
            }
            (ElementKind::Parameter, Some(_), Some(_)) => Ok(()),
            (_, Some(_), Some(_)) => {
                Err(DecorError::InvalidApplication("index on a non-parameter application"))
            }
            (_, Some(_), None) => Ok(()),
        }
    }
}

/// What a decorator callback learns about one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorInfo {
    /// Element the decorator is attached to
    pub kind: ElementKind,
    /// Owning class
    pub target: Target,
    /// Member name, for member applications
    pub member: Option<String>,
    /// Parameter position, for parameter applications
    pub index: Option<usize>,
    /// Declared type of the member
    pub declared_type: Option<TypeHint>,
    /// Return type of the method
    pub return_type: Option<TypeHint>,
    /// Parameter types of the method
    pub parameter_types: Option<Vec<TypeHint>>,
    /// Type of the decorated parameter
    pub parameter_type: Option<TypeHint>,
}

/// Builds the info record for `application`.
///
/// Fails with [`DecorError::InvalidApplication`] when the member name or
/// index does not match the kind, and with
/// [`DecorError::UnsupportedElementKind`] when the kind is not in `on`.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{extract, Application, Class, ElementKind, NoTypeHints, Target};
///
/// struct Api;
/// impl Class for Api {}
///
/// let application = Application::parameter(Target::of::<Api>(), "get", 1);
/// let info = extract(&application, &[ElementKind::Parameter], &NoTypeHints).unwrap();
/// assert_eq!(info.member.as_deref(), Some("get"));
/// assert_eq!(info.index, Some(1));
///
/// assert!(extract(&application, &[ElementKind::Class], &NoTypeHints).is_err());
/// ```
pub fn extract(
    application: &Application,
    on: &[ElementKind],
    hints: &dyn TypeHintSource,
) -> DecorResult<DecoratorInfo> {
    application.validate()?;
    if !on.contains(&application.kind) {
        return Err(DecorError::UnsupportedElementKind(application.kind));
    }

    let target = &application.target;
    let mut info = DecoratorInfo {
        kind: application.kind,
        target: *target,
        member: application.member.clone(),
        index: application.index,
        declared_type: None,
        return_type: None,
        parameter_types: None,
        parameter_type: None,
    };

    if let Some(member) = application.member.as_deref() {
        info.declared_type = hints.declared_type(target, member);
        info.return_type = hints.return_type(target, member);
        info.parameter_types = hints.parameter_types(target, member);
        info.parameter_type = match (&info.parameter_types, application.index) {
            (Some(types), Some(index)) => types.get(index).copied(),
            _ => None,
        };
    }

    Ok(info)
}
