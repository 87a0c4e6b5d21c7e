//! Property values that may be resolved by the provisioning engine

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A literal value or a reference resolved at provisioning time
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain string
    Literal(String),
    /// `Fn::Sub` template string (e.g., `${AWS::StackName}`)
    Sub(String),
    /// `Fn::GetAtt` of another resource in the graph
    GetAtt {
        /// Logical name of the resource
        resource: String,
        /// Attribute to read (e.g., "Arn")
        attribute: String,
    },
    /// `Ref` to another resource in the graph
    Ref(String),
}

impl PropertyValue {
    /// Create a literal value
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Create an attribute reference
    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Create a resource reference
    pub fn reference(resource: impl Into<String>) -> Self {
        Self::Ref(resource.into())
    }

    /// The literal string, if this is not a reference
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => serializer.serialize_str(value),
            Self::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
            Self::GetAtt {
                resource,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[resource, attribute])?;
                map.end()
            }
            Self::Ref(resource) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", resource)?;
                map.end()
            }
        }
    }
}
