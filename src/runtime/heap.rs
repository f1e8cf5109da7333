//! Arena object heap with identity-addressed references

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Identity of a heap entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A property or list element value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Ref(ObjectId),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_ref_id(&self) -> Option<ObjectId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Ref(id)
    }
}

/// An instance of a declared type
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Qualified name of the runtime type
    pub type_name: String,
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Instance(Instance),
    List(Vec<Value>),
}

/// Owns every object of a program run; references are `ObjectId`s
#[derive(Debug, Default)]
pub struct Heap {
    entries: Vec<Entry>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an instance with every property unset (null)
    pub fn alloc(&mut self, type_name: impl Into<String>) -> ObjectId {
        self.push(Entry::Instance(Instance {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }))
    }

    /// Allocate a list (a reference object, like `List<T>`)
    pub fn alloc_list(&mut self, items: Vec<Value>) -> ObjectId {
        self.push(Entry::List(items))
    }

    fn push(&mut self, entry: Entry) -> ObjectId {
        self.entries.push(entry);
        ObjectId(self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instance(&self, id: ObjectId) -> Result<&Instance> {
        match self.entries.get(id.0) {
            Some(Entry::Instance(instance)) => Ok(instance),
            Some(Entry::List(_)) => Err(Error::Other(format!("{} is a list, not an instance", id))),
            None => Err(Error::DanglingReference(id.0)),
        }
    }

    fn instance_mut(&mut self, id: ObjectId) -> Result<&mut Instance> {
        match self.entries.get_mut(id.0) {
            Some(Entry::Instance(instance)) => Ok(instance),
            Some(Entry::List(_)) => Err(Error::Other(format!("{} is a list, not an instance", id))),
            None => Err(Error::DanglingReference(id.0)),
        }
    }

    /// Elements of a list
    pub fn list(&self, id: ObjectId) -> Result<&[Value]> {
        match self.entries.get(id.0) {
            Some(Entry::List(items)) => Ok(items),
            Some(Entry::Instance(_)) => Err(Error::Other(format!("{} is an instance, not a list", id))),
            None => Err(Error::DanglingReference(id.0)),
        }
    }

    pub fn is_list(&self, id: ObjectId) -> bool {
        matches!(self.entries.get(id.0), Some(Entry::List(_)))
    }

    pub fn type_of(&self, id: ObjectId) -> Result<&str> {
        Ok(&self.instance(id)?.type_name)
    }

    /// Property value; unset properties read as null
    pub fn get(&self, id: ObjectId, property: &str) -> Result<Value> {
        Ok(self
            .instance(id)?
            .properties
            .get(property)
            .cloned()
            .unwrap_or(Value::Null))
    }

    pub fn set(&mut self, id: ObjectId, property: &str, value: Value) -> Result<()> {
        if let Value::Ref(target) = &value {
            if target.0 >= self.entries.len() {
                return Err(Error::DanglingReference(target.0));
            }
        }
        self.instance_mut(id)?
            .properties
            .insert(property.to_string(), value);
        Ok(())
    }

    /// Structural equality of two values, following references
    ///
    /// Cycles are handled by assuming a pair already under comparison is equal.
    pub fn structurally_equal(&self, a: &Value, b: &Value) -> bool {
        let mut assumed = HashSet::new();
        self.equal(a, b, &mut assumed)
    }

    fn equal(&self, a: &Value, b: &Value, assumed: &mut HashSet<(ObjectId, ObjectId)>) -> bool {
        let (x, y) = match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => (*x, *y),
            _ => return a == b,
        };
        if x == y || !assumed.insert((x, y)) {
            return true;
        }
        match (self.entries.get(x.0), self.entries.get(y.0)) {
            (Some(Entry::List(left)), Some(Entry::List(right))) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right)
                        .all(|(l, r)| self.equal(l, r, assumed))
            }
            (Some(Entry::Instance(left)), Some(Entry::Instance(right))) => {
                if left.type_name != right.type_name {
                    return false;
                }
                let keys: HashSet<&String> =
                    left.properties.keys().chain(right.properties.keys()).collect();
                keys.into_iter().all(|key| {
                    let l = left.properties.get(key).unwrap_or(&Value::Null);
                    let r = right.properties.get(key).unwrap_or(&Value::Null);
                    self.equal(l, r, assumed)
                })
            }
            _ => false,
        }
    }
}
