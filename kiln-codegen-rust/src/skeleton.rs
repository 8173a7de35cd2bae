//! Boilerplate layout of a generated Rust crate.

use std::path::Path;

use kiln_codegen::{Archetype, Layer, ProjectMeta, ProjectSkeleton};
use kiln_spec::Feature;

use crate::files::{
    CargoToml, Dockerfile, ErrorRs, GitIgnore, LayerMod, LibRs, MainRs, Makefile, Readme,
};

/// Layers the crate root declares: the archetype's source directories
/// plus every layer the features generate into.
pub fn project_layers(archetype: &Archetype, features: &[Feature]) -> Vec<Layer> {
    Layer::ALL
        .into_iter()
        .filter(|layer| archetype.has_source_dir(layer.dir()) || generates(*layer, features))
        .collect()
}

fn generates(layer: Layer, features: &[Feature]) -> bool {
    match layer {
        Layer::Models => true,
        Layer::Repositories => features.contains(&Feature::Repository),
        Layer::Services => features.contains(&Feature::Service),
        Layer::Handlers => features.contains(&Feature::Handlers),
    }
}

/// Build the skeleton for `archetype`, with a `mod.rs` placeholder for each
/// of `layers`. Generated module indexes replace the placeholders.
pub fn synthesize(
    root: &Path,
    meta: &ProjectMeta,
    archetype: &'static Archetype,
    layers: &[Layer],
) -> ProjectSkeleton {
    let mut skeleton = ProjectSkeleton::new(root, &meta.module, archetype);
    for layer in layers {
        skeleton.add_directory(Path::new("src").join(layer.dir()));
    }

    skeleton.add_file(
        &CargoToml::new(&meta.module)
            .with_version(meta.version.clone())
            .with_description(&meta.description)
            .with_authors(meta.authors.clone()),
    );
    skeleton.add_file(&GitIgnore {
        binary_dir: archetype.binary.then(|| "bin".to_string()),
    });
    skeleton.add_file(&Makefile {
        binary: archetype.binary,
        container: archetype.container.then(|| meta.module.clone()),
    });
    skeleton.add_file(&Readme {
        meta: meta.clone(),
        archetype: archetype.name,
        layers: layers.iter().map(Layer::dir).collect(),
    });
    skeleton.add_file(&LibRs {
        description: meta.description.clone(),
        layers: layers.to_vec(),
    });
    skeleton.add_file(&ErrorRs);
    for layer in layers {
        skeleton.add_file(&LayerMod { layer: *layer });
    }

    if archetype.binary {
        skeleton.add_file(&MainRs {
            module: meta.module.clone(),
        });
    }
    if archetype.container {
        skeleton.add_file(&Dockerfile {
            binary: meta.module.clone(),
        });
    }

    skeleton
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use kiln_core::Version;

    use super::*;

    fn meta() -> ProjectMeta {
        ProjectMeta {
            name: "Shop".into(),
            module: "shop".into(),
            version: Version::default(),
            description: "Shop generated by kiln".into(),
            authors: Vec::new(),
        }
    }

    fn paths(skeleton: &ProjectSkeleton) -> Vec<PathBuf> {
        skeleton.files().iter().map(|f| f.path().to_path_buf()).collect()
    }

    #[test]
    fn test_library_layers_follow_features() {
        let library = Archetype::lookup("library").unwrap();

        assert_eq!(
            project_layers(library, &[Feature::Repository]),
            vec![Layer::Models, Layer::Repositories]
        );
        assert_eq!(
            project_layers(library, &[Feature::Repository, Feature::Service]),
            vec![Layer::Models, Layer::Repositories, Layer::Services]
        );
    }

    #[test]
    fn test_microservice_skeleton() {
        let archetype = Archetype::lookup("microservice").unwrap();
        let layers = project_layers(archetype, archetype.default_features);
        let skeleton = synthesize(Path::new("/tmp/shop"), &meta(), archetype, &layers);
        let paths = paths(&skeleton);

        for expected in [
            "Cargo.toml",
            ".gitignore",
            "Makefile",
            "README.md",
            "src/lib.rs",
            "src/error.rs",
            "src/models/mod.rs",
            "src/handlers/mod.rs",
            "src/main.rs",
            "Dockerfile",
        ] {
            assert!(paths.contains(&PathBuf::from(expected)), "missing {expected}");
        }
    }

    #[test]
    fn test_library_skeleton_has_no_entry_point() {
        let archetype = Archetype::lookup("library").unwrap();
        let layers = project_layers(archetype, &[Feature::Repository]);
        let skeleton = synthesize(Path::new("/tmp/shop"), &meta(), archetype, &layers);
        let paths = paths(&skeleton);

        assert!(!paths.contains(&PathBuf::from("src/main.rs")));
        assert!(!paths.contains(&PathBuf::from("Dockerfile")));
        assert!(!paths.contains(&PathBuf::from("src/services/mod.rs")));
    }

    #[test]
    fn test_layers_outside_archetype_get_directories() {
        let archetype = Archetype::lookup("library").unwrap();
        let layers = project_layers(archetype, &Feature::normalize(&[Feature::Handlers]));
        let skeleton = synthesize(Path::new("/tmp/shop"), &meta(), archetype, &layers);

        assert!(skeleton.directories().contains(&PathBuf::from("src/handlers")));
        assert!(skeleton.directories().contains(&PathBuf::from("src/services")));
    }
}
