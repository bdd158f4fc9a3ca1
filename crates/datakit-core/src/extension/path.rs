use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extension::error::PathError;

/// Separator between the components of cooker and output paths.
pub const PATH_SEPARATOR: char = '/';

fn check_component(component: &str) -> Result<(), PathError> {
    if component.contains(PATH_SEPARATOR) {
        return Err(PathError::ContainsSeparator {
            component: component.to_string(),
            separator: PATH_SEPARATOR,
        });
    }
    Ok(())
}

/// Identifies a data cooker.
///
/// A source cooker carries the id of the source parser it is bound to. A
/// composite cooker has an empty source parser id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataCookerPath {
    source_parser_id: String,
    data_cooker_id: String,
}

impl DataCookerPath {
    /// Create a path for a cooker bound to `source_parser_id`.
    pub fn for_source(source_parser_id: &str, data_cooker_id: &str) -> Result<Self, PathError> {
        if source_parser_id.is_empty() {
            return Err(PathError::Malformed {
                path: format!("{}{}{}", source_parser_id, PATH_SEPARATOR, data_cooker_id),
                reason: "a source data cooker path requires a source parser id".to_string(),
            });
        }
        Self::new(source_parser_id, data_cooker_id)
    }

    /// Create a path for a composite cooker.
    pub fn for_composite(data_cooker_id: &str) -> Result<Self, PathError> {
        Self::new("", data_cooker_id)
    }

    fn new(source_parser_id: &str, data_cooker_id: &str) -> Result<Self, PathError> {
        if data_cooker_id.is_empty() {
            return Err(PathError::EmptyCookerId);
        }
        check_component(source_parser_id)?;
        check_component(data_cooker_id)?;
        Ok(Self {
            source_parser_id: source_parser_id.to_string(),
            data_cooker_id: data_cooker_id.to_string(),
        })
    }

    /// Parse `"{sourceParserId}/{cookerId}"`. A leading separator denotes a composite cooker.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let (parser, cooker) = path.split_once(PATH_SEPARATOR).ok_or_else(|| PathError::Malformed {
            path: path.to_string(),
            reason: format!("expected '{{sourceParserId}}{}{{cookerId}}'", PATH_SEPARATOR),
        })?;
        Self::new(parser, cooker)
    }

    pub fn source_parser_id(&self) -> &str {
        &self.source_parser_id
    }

    pub fn data_cooker_id(&self) -> &str {
        &self.data_cooker_id
    }

    /// Whether this path names a cooker bound to a source parser.
    pub fn is_source(&self) -> bool {
        !self.source_parser_id.is_empty()
    }

    /// Whether this path names a composite cooker.
    pub fn is_composite(&self) -> bool {
        self.source_parser_id.is_empty()
    }

    /// Build the path of one of this cooker's outputs.
    pub fn output(&self, output_id: &str) -> Result<DataOutputPath, PathError> {
        DataOutputPath::new(self.clone(), output_id)
    }
}

impl fmt::Display for DataCookerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source_parser_id, PATH_SEPARATOR, self.data_cooker_id)
    }
}

impl FromStr for DataCookerPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataCookerPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataCookerPath> for String {
    fn from(path: DataCookerPath) -> Self {
        path.to_string()
    }
}

/// Identifies one named output of a data cooker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataOutputPath {
    cooker_path: DataCookerPath,
    output_id: String,
}

impl DataOutputPath {
    pub fn new(cooker_path: DataCookerPath, output_id: &str) -> Result<Self, PathError> {
        if output_id.is_empty() {
            return Err(PathError::EmptyOutputId);
        }
        check_component(output_id)?;
        Ok(Self {
            cooker_path,
            output_id: output_id.to_string(),
        })
    }

    /// Parse `"{sourceParserId}/{cookerId}/{outputId}"`, splitting on the last separator.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let (cooker, output) = path.rsplit_once(PATH_SEPARATOR).ok_or_else(|| PathError::Malformed {
            path: path.to_string(),
            reason: "expected '{cookerPath}/{outputId}'".to_string(),
        })?;
        Self::new(DataCookerPath::parse(cooker)?, output)
    }

    pub fn cooker_path(&self) -> &DataCookerPath {
        &self.cooker_path
    }

    pub fn output_id(&self) -> &str {
        &self.output_id
    }

    pub fn source_parser_id(&self) -> &str {
        self.cooker_path.source_parser_id()
    }
}

impl fmt::Display for DataOutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.cooker_path, PATH_SEPARATOR, self.output_id)
    }
}

impl FromStr for DataOutputPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifies a data processor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataProcessorId(String);

impl DataProcessorId {
    pub fn new(id: &str) -> Result<Self, PathError> {
        if id.trim().is_empty() {
            return Err(PathError::EmptyProcessorId);
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DataProcessorId {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DataProcessorId {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DataProcessorId> for String {
    fn from(id: DataProcessorId) -> Self {
        id.0
    }
}

/// Key a source parser attaches to each data element it hands to cookers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKey(String);

impl DataKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DataKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DataKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for DataKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
