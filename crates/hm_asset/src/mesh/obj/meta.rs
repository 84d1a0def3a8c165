use anyhow::Result;
use holomesh::assets::obj::SplitMode;
use serde::Deserialize;
use std::path::Path;

/// Per-model import settings, read from `<model>.toml` or a folder scoped `obj.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ObjMeta {
    pub(crate) split_by_material: bool,
    pub(crate) calculate_normals: bool,
    pub(crate) default_material: String,
}

impl Default for ObjMeta {
    fn default() -> Self {
        Self {
            split_by_material: false,
            calculate_normals: false,
            default_material: String::from("default"),
        }
    }
}

impl ObjMeta {
    pub(crate) fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let meta: Self = toml::from_slice(&data)?;
        Ok(meta)
    }

    pub(crate) fn split_mode(&self) -> SplitMode {
        if self.split_by_material {
            SplitMode::BySplitMaterial
        } else {
            SplitMode::ByObject
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_meta() -> Result<()> {
        let meta: ObjMeta = toml::from_str("split_by_material = true")?;
        assert_eq!(meta.split_mode(), SplitMode::BySplitMaterial);
        assert!(!meta.calculate_normals);
        assert_eq!(meta.default_material, "default");
        Ok(())
    }

    #[test]
    fn test_empty_meta() -> Result<()> {
        let meta: ObjMeta = toml::from_str("")?;
        assert_eq!(meta, ObjMeta::default());
        assert_eq!(meta.split_mode(), SplitMode::ByObject);
        Ok(())
    }
}
