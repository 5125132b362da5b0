use serde::ser::{Error as SerError, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const PROFILE_MODULE: &str = "profile";
pub const FIT_MODULE: &str = "fit";
pub const PROFILE_OBJECT: &str = "Profile";
pub const PROFILE_FILENAME: &str = "profile.json";

/// Fit-module objects and the fixed file each one is exported to.
pub const FIT_EXPORT_TABLES: [(&str, &str); 4] = [
    ("BASE_TYPE", "base_type.json"),
    ("FIELD_TYPE_TO_BASE_TYPE", "field_type_to_base_type.json"),
    ("BASE_TYPE_DEFINITIONS", "base_type_definitions.json"),
    ("NUMERIC_FIELD_TYPES", "numeric_field_types.json"),
];

/// A data value read out of an SDK source module.
///
/// Covers the literal subset of Python the FIT SDK data files are written in.
/// `Dict` keeps insertion order so repeated exports are byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<PyValue>),
    Tuple(Vec<PyValue>),
    Set(Vec<PyValue>),
    Dict(Vec<(PyValue, PyValue)>),
}

impl PyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PyValue::None => "NoneType",
            PyValue::Bool(_) => "bool",
            PyValue::Int(_) => "int",
            PyValue::Float(_) => "float",
            PyValue::Str(_) => "str",
            PyValue::Bytes(_) => "bytes",
            PyValue::List(_) => "list",
            PyValue::Tuple(_) => "tuple",
            PyValue::Set(_) => "set",
            PyValue::Dict(_) => "dict",
        }
    }

    // JSON object key for a dict key, with json.dumps coercion rules.
    fn json_key<E: SerError>(&self) -> std::result::Result<String, E> {
        match self {
            PyValue::Str(s) => Ok(s.clone()),
            PyValue::Int(i) => Ok(i.to_string()),
            PyValue::Float(f) if f.is_finite() => Ok(format_float_key(*f)),
            PyValue::Bool(true) => Ok("true".to_string()),
            PyValue::Bool(false) => Ok("false".to_string()),
            PyValue::None => Ok("null".to_string()),
            other => Err(E::custom(format!(
                "keys must be str, int, float, bool or None, not {}",
                other.type_name()
            ))),
        }
    }
}

fn format_float_key(f: f64) -> String {
    // repr(1.0) is "1.0", not "1"
    if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl Serialize for PyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PyValue::None => serializer.serialize_unit(),
            PyValue::Bool(b) => serializer.serialize_bool(*b),
            PyValue::Int(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    Err(S::Error::custom("integer out of JSON number range"))
                }
            }
            PyValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            PyValue::Float(_) => Err(S::Error::custom(
                "Out of range float values are not JSON compliant",
            )),
            PyValue::Str(s) => serializer.serialize_str(s),
            PyValue::Bytes(_) | PyValue::Set(_) => Err(S::Error::custom(format!(
                "Object of type {} is not JSON serializable",
                self.type_name()
            ))),
            PyValue::List(items) | PyValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PyValue::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.json_key::<S::Error>()?, value)?;
                }
                map.end()
            }
        }
    }
}

/// Handle to a loaded SDK source module: its top-level name→value bindings.
#[derive(Debug, Clone)]
pub struct SourceModule {
    name: String,
    path: PathBuf,
    bindings: HashMap<String, PyValue>,
}

impl SourceModule {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        bindings: HashMap<String, PyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            bindings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PyValue> {
        self.bindings.get(name)
    }

    pub fn take(&mut self, name: &str) -> Option<PyValue> {
        self.bindings.remove(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug)]
pub struct SdkModules {
    pub profile: SourceModule,
    pub fit: SourceModule,
}

#[derive(Debug)]
pub struct FitTable {
    pub name: &'static str,
    pub filename: &'static str,
    pub value: Option<PyValue>,
}

#[derive(Debug)]
pub struct ExportPlan {
    pub profile: PyValue,
    pub tables: Vec<FitTable>,
}

impl ExportPlan {
    /// Number of data objects that will actually be written, profile included.
    pub fn object_count(&self) -> usize {
        1 + self.tables.iter().filter(|t| t.value.is_some()).count()
    }
}
