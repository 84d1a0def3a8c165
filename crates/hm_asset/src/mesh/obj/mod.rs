mod meta;

use anyhow::{Context, Result};
use holomesh::assets::obj::{self, MeshSource, ObjDecoder};
use holomesh::scene::{Entity, Material};
use hm_format::mesh::MeshData;
use log::info;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::utils;

use self::meta::ObjMeta;

fn decoder(meta: &ObjMeta) -> ObjDecoder<'static> {
    ObjDecoder::new(Arc::new(Material::new(meta.default_material.as_str())))
        .with_split_mode(meta.split_mode())
        .with_calculated_normals(meta.calculate_normals)
}

fn parse(path: &Path, meta: &ObjMeta) -> Result<Vec<MeshData>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    decoder(meta)
        .decode_meshes(file)
        .with_context(|| format!("Could not decode {}", path.display()))
}

fn save(path: &Path, output_dir: &Path, meshes: Vec<MeshData>) -> Result<()> {
    let file_name = utils::file_name(path)?;
    let single = meshes.len() == 1;

    for mesh in meshes {
        let target = if single {
            utils::combine_path(output_dir, file_name, "vem")
        } else {
            let name = format!("{}_{}", file_name, utils::sanitize(&mesh.name));
            utils::combine_path(output_dir, &name, "vem")
        };
        let data = mesh
            .to_bytes()
            .with_context(|| format!("Could not serialize mesh \"{}\"", mesh.name))?;
        utils::write_file(&target, &data)?;
        info!("Wrote {}", target.display());
    }
    Ok(())
}

/// Parse meta from file called `file.toml` or alternativley from folder scoped meta file named `obj.toml` or else use default meta
fn parse_meta(path: &Path) -> Result<ObjMeta> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;
    let meta_file = utils::file_name(path)?;

    let path = utils::combine_path(dir, meta_file, "toml");
    if path.is_file() {
        return ObjMeta::parse(&path);
    }

    // check if folder scoped meta exists
    let path = utils::combine_path(dir, "obj", "toml");
    if path.is_file() {
        return ObjMeta::parse(&path);
    }

    Ok(ObjMeta::default())
}

/// Converts one `.obj` file into one binary mesh per object
pub(crate) fn process(path: &Path, output_dir: &Path) -> Result<()> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());
    let meta = parse_meta(path)?;
    save(path, output_dir, parse(path, &meta)?)
}

/// Decodes all `inputs` and writes every object, placed by its container, into `output`
pub(crate) fn merge(inputs: &[&Path], output: &Path) -> Result<()> {
    let containers = inputs
        .iter()
        .map(|path| {
            let meta = parse_meta(path)?;
            decoder(&meta)
                .load_file(path, None)
                .with_context(|| format!("Could not decode {}", path.display()))
        })
        .collect::<Result<Vec<Entity>>>()?;

    let sources: Vec<MeshSource> = containers.iter().flat_map(MeshSource::collect).collect();
    info!(
        "Merging {} objects from {} files into {}",
        sources.len(),
        containers.len(),
        output.display()
    );

    let file =
        File::create(output).with_context(|| format!("Could not create {}", output.display()))?;
    obj::encode(sources, file).with_context(|| format!("Could not write {}", output.display()))?;
    Ok(())
}
