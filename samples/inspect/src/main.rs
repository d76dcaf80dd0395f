use std::{path::Path, process::ExitCode};

use clap::Parser;
use scenery::{
    error::EntityKind,
    provider::fs::{file_url, FsError, FsProvider},
    Error, ImageLookup, SceneResolver,
};

mod cli;

#[derive(Debug, thiserror::Error)]
enum InspectError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Resolve(#[from] Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli.init_tracing();

    let provider = FsProvider {
        map_files: !cli.no_mmap,
    };
    let mut resolver = SceneResolver::with_config(provider, cli.resolver_config());

    let mut status = ExitCode::SUCCESS;
    for path in &cli.files {
        if let Err(e) = inspect(&mut resolver, path, cli.images).await {
            tracing::error!(path = ?path, error = %e, "failed to inspect glTF document");
            status = ExitCode::FAILURE;
        }
    }
    status
}

async fn inspect(
    resolver: &mut SceneResolver<FsProvider>,
    path: &Path,
    images: bool,
) -> Result<(), InspectError> {
    resolver.load(file_url(path)?).await?;
    println!("{}", path.display());

    match resolver.walk_scene() {
        Ok(nodes) => {
            for n in nodes {
                let Some(node) = resolver.node(n.index) else {
                    continue;
                };
                println!(
                    "{:indent$}node {} {:?} mesh={:?} at ({:.3}, {:.3}, {:.3})",
                    "",
                    n.index,
                    node.name.as_deref().unwrap_or_default(),
                    node.mesh.as_ref().map(|m| m.value()),
                    n.world[(0, 3)],
                    n.world[(1, 3)],
                    n.world[(2, 3)],
                    indent = 2 + n.depth * 2,
                );
            }
        }
        Err(Error::NotFound {
            kind: EntityKind::Scene,
            ..
        }) => println!("  (no scenes)"),
        Err(e) => return Err(e.into()),
    }

    let Some(doc) = resolver.document() else {
        return Ok(());
    };
    for (m, mesh) in doc.meshes.iter().enumerate() {
        for (p, prim) in mesh.primitives.iter().enumerate() {
            println!("  mesh {m} primitive {p}");
            for (semantic, acc) in &prim.attributes {
                describe_accessor(resolver, &format!("{semantic:?}"), acc.value()).await?;
            }
            if let Some(indices) = &prim.indices {
                describe_accessor(resolver, "indices", indices.value()).await?;
            }
        }
    }

    if images {
        let (label, count) = match resolver.config().image_lookup {
            ImageLookup::Passthrough => ("image", doc.images.len()),
            ImageLookup::TextureSource => ("texture", doc.textures.len()),
        };
        for i in 0..count {
            let image = resolver.image(i).await?;
            println!(
                "  {label} {i}: {} bytes ({})",
                image.bytes.len(),
                image.mime_type.as_deref().unwrap_or("unknown type")
            );
        }
    }

    Ok(())
}

async fn describe_accessor(
    resolver: &SceneResolver<FsProvider>,
    label: &str,
    index: usize,
) -> Result<(), Error> {
    let slice = resolver.data(index).await?;
    let count = resolver.accessor(index).map_or(0, |a| a.count);
    println!(
        "    {label}: accessor {index}, {count} x {:?} ({} elements in view, offset {:?}, stride {:?})",
        slice.data.data_type(),
        slice.data.len(),
        slice.offset,
        slice.stride,
    );
    Ok(())
}
