use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

/// Kinds of catalog resources that can carry tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    #[default]
    Table,
    Dashboard,
    User,
    Feature,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ResourceType::Table => write!(f, "table"),
            ResourceType::Dashboard => write!(f, "dashboard"),
            ResourceType::User => write!(f, "user"),
            ResourceType::Feature => write!(f, "feature"),
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ResourceType::Table),
            "dashboard" => Ok(ResourceType::Dashboard),
            "user" => Ok(ResourceType::User),
            "feature" => Ok(ResourceType::Feature),
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}

/// Identifies one taggable resource: its type plus its catalog key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: ResourceType,
    pub key: String,
}

impl ResourceRef {
    pub fn new(resource_type: ResourceType, key: impl Into<String>) -> Self {
        Self {
            resource_type,
            key: key.into(),
        }
    }

    pub fn table(key: impl Into<String>) -> Self {
        Self::new(ResourceType::Table, key)
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.key)
    }
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
