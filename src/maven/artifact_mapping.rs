use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Maps a file extension (without leading '.') to an artifact type, or `None` if the provider
///  has no opinion about it.
pub trait ArtifactMappingProvider: Debug + Send + Sync {
    fn map_extension_to_type(&self, extension: &str) -> Option<String>;
}

/// Built-in mappings for extensions whose type differs from the extension
#[derive(Debug, Default, Clone)]
pub struct DefaultArtifactMappingProvider {}

impl ArtifactMappingProvider for DefaultArtifactMappingProvider {
    fn map_extension_to_type(&self, extension: &str) -> Option<String> {
        match extension {
            "tar.gz" => Some("distribution-tgz".to_string()),
            "tar.bz2" => Some("distribution-bzip".to_string()),
            "zip" => Some("distribution-zip".to_string()),
            _ => None,
        }
    }
}

/// Mappings from configuration
#[derive(Debug, Default, Clone)]
pub struct ConfiguredArtifactMappingProvider {
    extension_to_type: HashMap<String, String>,
}
impl ConfiguredArtifactMappingProvider {
    pub fn new(extension_to_type: HashMap<String, String>) -> ConfiguredArtifactMappingProvider {
        ConfiguredArtifactMappingProvider {
            extension_to_type,
        }
    }
}
impl ArtifactMappingProvider for ConfiguredArtifactMappingProvider {
    fn map_extension_to_type(&self, extension: &str) -> Option<String> {
        self.extension_to_type.get(extension).cloned()
    }
}

/// Ordered list of providers, consulted first-match-wins.
///
/// An empty list is valid: every type is then simply the file extension.
#[derive(Debug, Clone)]
pub struct ArtifactMappings {
    providers: Vec<Arc<dyn ArtifactMappingProvider>>,
}
impl ArtifactMappings {
    pub fn new(providers: Vec<Arc<dyn ArtifactMappingProvider>>) -> ArtifactMappings {
        ArtifactMappings {
            providers,
        }
    }

    pub fn empty() -> ArtifactMappings {
        ArtifactMappings::new(vec![])
    }

    pub fn resolve_type(&self, extension: Option<&str>) -> Option<String> {
        let extension = extension?;
        self.providers.iter()
            .find_map(|p| p.map_extension_to_type(extension))
            .or_else(|| Some(extension.to_string()))
    }
}
impl Default for ArtifactMappings {
    fn default() -> Self {
        ArtifactMappings::new(vec![Arc::new(DefaultArtifactMappingProvider::default())])
    }
}
