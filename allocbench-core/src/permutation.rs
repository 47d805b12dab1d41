//! Permutation Space
//!
//! A benchmark declares named argument dimensions, each with an ordered
//! domain of values (`threads = [1, 2, 4]`, `size = [64, 4096]`). Every
//! combination is one [`Permutation`]; the allocator runs are keyed by it.
//!
//! Enumeration follows nested-loop order: the first declared dimension varies
//! slowest, the last one fastest.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Errors from building argument spaces or permutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PermutationError {
    /// A dimension name was declared twice.
    #[error("Duplicate argument dimension: {0}")]
    DuplicateDimension(String),

    /// A dimension was declared without any values.
    #[error("Argument dimension '{0}' has an empty domain")]
    EmptyDomain(String),

    /// A name does not refer to any declared dimension.
    #[error("Unknown argument dimension: {0}")]
    UnknownDimension(String),

    /// A permutation mapping lacks a value for a declared dimension.
    #[error("Missing value for argument dimension: {0}")]
    MissingDimension(String),

    /// A permutation mapping names a value outside the dimension's domain.
    #[error("Value {value} is not in the domain of argument dimension '{dimension}'")]
    ValueOutsideDomain {
        /// Dimension name
        dimension: String,
        /// Offending value
        value: ArgValue,
    },
}

/// One value of an argument dimension
///
/// Floats compare and hash by bit pattern so permutations stay usable as map
/// keys. `Int(1)` and `Float(1.0)` are different values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Boolean flag
    Bool(bool),
    /// Integer such as a thread count or object size
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Free-form string such as a workload name
    Str(String),
}

impl ArgValue {
    fn rank(&self) -> u8 {
        match self {
            ArgValue::Bool(_) => 0,
            ArgValue::Int(_) => 1,
            ArgValue::Float(_) => 2,
            ArgValue::Str(_) => 3,
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArgValue {}

impl Ord for ArgValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ArgValue::Bool(a), ArgValue::Bool(b)) => a.cmp(b),
            (ArgValue::Int(a), ArgValue::Int(b)) => a.cmp(b),
            (ArgValue::Float(a), ArgValue::Float(b)) => a.total_cmp(b),
            (ArgValue::Str(a), ArgValue::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ArgValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ArgValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            ArgValue::Bool(b) => b.hash(state),
            ArgValue::Int(i) => i.hash(state),
            ArgValue::Float(f) => f.to_bits().hash(state),
            ArgValue::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! arg_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(v: $t) -> Self {
                ArgValue::Int(v as i64)
            }
        })*
    };
}

arg_value_from_int!(i8, i16, i32, i64, u8, u16, u32, usize);

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

/// A named argument dimension and its ordered domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension name
    pub name: String,
    /// Possible values, in declaration order
    pub values: Vec<ArgValue>,
}

/// The argument dimensions of one benchmark
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dimension>", into = "Vec<Dimension>")]
pub struct ArgumentSpace {
    names: Arc<[String]>,
    domains: Vec<Vec<ArgValue>>,
}

impl ArgumentSpace {
    /// Space without dimensions; yields exactly one empty permutation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension after the existing ones
    pub fn with_dimension<V: Into<ArgValue>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, PermutationError> {
        let mut dimensions: Vec<Dimension> = self.into();
        dimensions.push(Dimension {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        Self::from_dimensions(dimensions)
    }

    /// Build a space from dimensions in canonical order
    pub fn from_dimensions(dimensions: Vec<Dimension>) -> Result<Self, PermutationError> {
        let mut names = Vec::with_capacity(dimensions.len());
        let mut domains = Vec::with_capacity(dimensions.len());
        for dim in dimensions {
            if names.contains(&dim.name) {
                return Err(PermutationError::DuplicateDimension(dim.name));
            }
            if dim.values.is_empty() {
                return Err(PermutationError::EmptyDomain(dim.name));
            }
            names.push(dim.name);
            domains.push(dim.values);
        }
        Ok(Self {
            names: names.into(),
            domains,
        })
    }

    /// Dimension names in canonical order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Domain of a dimension
    pub fn domain(&self, name: &str) -> Option<&[ArgValue]> {
        self.index_of(name).map(|i| self.domains[i].as_slice())
    }

    /// Number of dimensions
    pub fn dimension_count(&self) -> usize {
        self.names.len()
    }

    /// Number of permutations in the full Cartesian product
    pub fn permutation_count(&self) -> usize {
        self.domains.iter().map(Vec::len).product()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Iterate all permutations in canonical order
    pub fn permutations(&self) -> Permutations<'_> {
        Permutations {
            space: self,
            indices: vec![0; self.domains.len()],
            fixed: Vec::new(),
            done: false,
        }
    }

    /// Iterate the permutations matching every fixed dimension value
    ///
    /// Relative order is the same as [`ArgumentSpace::permutations`]. A fixed
    /// value outside the dimension's domain simply matches nothing; a fixed
    /// name that is not a dimension is an error.
    pub fn permutations_fixed<K, V, I>(&self, fixed: I) -> Result<Permutations<'_>, PermutationError>
    where
        K: AsRef<str>,
        V: Into<ArgValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fixed = fixed
            .into_iter()
            .map(|(name, value)| {
                let name = name.as_ref();
                self.index_of(name)
                    .map(|i| (i, value.into()))
                    .ok_or_else(|| PermutationError::UnknownDimension(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Permutations {
            fixed,
            ..self.permutations()
        })
    }

    /// Look up the permutation described by a plain `name -> value` mapping
    pub fn permutation<K, V, I>(&self, pairs: I) -> Result<Permutation, PermutationError>
    where
        K: AsRef<str>,
        V: Into<ArgValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut values: Vec<Option<ArgValue>> = vec![None; self.names.len()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let i = self
                .index_of(name)
                .ok_or_else(|| PermutationError::UnknownDimension(name.to_string()))?;
            let value = value.into();
            if !self.domains[i].contains(&value) {
                return Err(PermutationError::ValueOutsideDomain {
                    dimension: name.to_string(),
                    value,
                });
            }
            values[i] = Some(value);
        }

        let values = values
            .into_iter()
            .zip(self.names.iter())
            .map(|(v, name)| v.ok_or_else(|| PermutationError::MissingDimension(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Permutation {
            names: Arc::clone(&self.names),
            values: values.into(),
        })
    }
}

impl TryFrom<Vec<Dimension>> for ArgumentSpace {
    type Error = PermutationError;

    fn try_from(dimensions: Vec<Dimension>) -> Result<Self, Self::Error> {
        Self::from_dimensions(dimensions)
    }
}

impl From<ArgumentSpace> for Vec<Dimension> {
    fn from(space: ArgumentSpace) -> Self {
        space
            .names
            .iter()
            .cloned()
            .zip(space.domains)
            .map(|(name, values)| Dimension { name, values })
            .collect()
    }
}

/// One combination of argument values
///
/// Equality, ordering and hashing consider the values only; the dimension
/// names are shared with the [`ArgumentSpace`] the permutation came from.
#[derive(Debug, Clone)]
pub struct Permutation {
    names: Arc<[String]>,
    values: Box<[ArgValue]>,
}

impl Permutation {
    /// Value of a dimension
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Dimension names in canonical order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values in canonical dimension order
    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    /// `(name, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// True for the single permutation of a benchmark without arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values joined by `-`, e.g. `4-4096`
    pub fn label(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Plain `name -> value` mapping
    pub fn to_map(&self) -> BTreeMap<String, ArgValue> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl PartialEq for Permutation {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Permutation {}

impl Hash for Permutation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl Ord for Permutation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.values.cmp(&other.values)
    }
}

impl PartialOrd for Permutation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str(")")
    }
}

/// Lazy iterator over the permutations of an [`ArgumentSpace`]
#[derive(Debug, Clone)]
pub struct Permutations<'a> {
    space: &'a ArgumentSpace,
    indices: Vec<usize>,
    fixed: Vec<(usize, ArgValue)>,
    done: bool,
}

impl Permutations<'_> {
    fn current(&self) -> Permutation {
        let values = self
            .indices
            .iter()
            .zip(&self.space.domains)
            .map(|(&i, domain)| domain[i].clone())
            .collect::<Vec<_>>();
        Permutation {
            names: Arc::clone(&self.space.names),
            values: values.into(),
        }
    }

    fn matches_fixed(&self) -> bool {
        self.fixed
            .iter()
            .all(|(dim, value)| self.space.domains[*dim][self.indices[*dim]] == *value)
    }

    // Odometer step: the last dimension turns fastest.
    fn advance(&mut self) {
        for dim in (0..self.indices.len()).rev() {
            self.indices[dim] += 1;
            if self.indices[dim] < self.space.domains[dim].len() {
                return;
            }
            self.indices[dim] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Permutations<'_> {
    type Item = Permutation;

    fn next(&mut self) -> Option<Permutation> {
        while !self.done {
            let matched = self.matches_fixed();
            let perm = matched.then(|| self.current());
            self.advance();
            if perm.is_some() {
                return perm;
            }
        }
        None
    }
}
