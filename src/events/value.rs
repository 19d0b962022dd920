//! Dynamically typed event arguments.
//!
//! Events carry a list of [`Value`]s. Each value reports a [`ValueKind`], and
//! kinds form a small single-parent hierarchy rooted at [`ValueKind::Object`]:
//!
//! ```text
//! Object
//! ├── Nil, Boolean, String, Symbol
//! ├── Numeric
//! │   ├── Integer
//! │   └── Float
//! └── Vector2, Rect, Color, Entity, List
//! ```
//!
//! Matchers declare a target kind and only screen values whose kind `is_a`
//! that target.

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::events::error::EventError;
use crate::resources::image::Color;

/// Arguments carried by a raised event. Most events carry one or two.
pub type EventArgs = SmallVec<[Value; 4]>;

/// Builds an [`EventArgs`] from anything convertible into [`Value`].
///
/// ```ignore
/// runner.raise_event("hit", args![entity, 10, "sword"]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::events::value::EventArgs::new()
    };
    ($($v:expr),+ $(,)?) => {{
        let mut args = $crate::events::value::EventArgs::new();
        $(args.push($crate::events::value::Value::from($v));)+
        args
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// True if `self` lies entirely within `other`.
    pub fn inside(&self, other: &Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.x + self.w <= other.x + other.w
            && self.y + self.h <= other.y + other.h
    }

    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Root of the hierarchy. Every kind is an `Object`.
    Object,
    Nil,
    Boolean,
    /// Abstract parent of `Integer` and `Float`.
    Numeric,
    Integer,
    Float,
    String,
    Symbol,
    Vector2,
    Rect,
    Color,
    Entity,
    List,
}

impl ValueKind {
    /// Immediate parent in the hierarchy; `None` only for `Object`.
    pub fn parent(self) -> Option<ValueKind> {
        match self {
            ValueKind::Object => None,
            ValueKind::Integer | ValueKind::Float => Some(ValueKind::Numeric),
            _ => Some(ValueKind::Object),
        }
    }

    /// True if `self` equals `ancestor` or descends from it.
    pub fn is_a(self, ancestor: ValueKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Closest kind both `self` and `other` descend from.
    pub fn common_ancestor(self, other: ValueKind) -> ValueKind {
        let mut current = self;
        while !other.is_a(current) {
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Object => "object",
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Numeric => "numeric",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::Vector2 => "vector2",
            ValueKind::Rect => "rect",
            ValueKind::Color => "color",
            ValueKind::Entity => "entity",
            ValueKind::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "object" | "any" => ValueKind::Object,
            "nil" => ValueKind::Nil,
            "boolean" | "bool" => ValueKind::Boolean,
            "numeric" => ValueKind::Numeric,
            "integer" | "int" => ValueKind::Integer,
            "float" => ValueKind::Float,
            "string" => ValueKind::String,
            "symbol" => ValueKind::Symbol,
            "vector2" => ValueKind::Vector2,
            "rect" => ValueKind::Rect,
            "color" => ValueKind::Color,
            "entity" => ValueKind::Entity,
            "list" => ValueKind::List,
            _ => return Err(EventError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}

/// A single event argument.
///
/// Deserialized untagged so scripted events read naturally in JSON
/// (`[15, "door", {"x": 1.0, "y": 2.0}]`). Symbols and entities cannot be
/// scripted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    #[serde(skip_deserializing)]
    Symbol(String),
    Rect(Rect),
    Vector2(Vector2),
    Color(Color),
    #[serde(skip_deserializing)]
    Entity(Entity),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Vector2(_) => ValueKind::Vector2,
            Value::Rect(_) => ValueKind::Rect,
            Value::Color(_) => ValueKind::Color,
            Value::Entity(_) => ValueKind::Entity,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Value::Rect(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<Vector2> {
        match self {
            Value::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<Entity> {
        match self {
            Value::Entity(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vector2> for Value {
    fn from(v: Vector2) -> Self {
        Value::Vector2(v)
    }
}

impl From<Rect> for Value {
    fn from(v: Rect) -> Self {
        Value::Rect(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<Entity> for Value {
    fn from(v: Entity) -> Self {
        Value::Entity(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
