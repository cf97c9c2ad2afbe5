//! Effect bundles.
//!
//! An effect bundle is a TOML manifest describing named techniques, each an
//! ordered list of passes, plus the WGSL source the passes' entry points
//! live in:
//!
//! ```toml
//! profile = "wgsl"
//! source = "triangle.wgsl"
//!
//! [[technique]]
//! name = "Render"
//!
//! [[technique.pass]]
//! name = "P0"
//! vertex = "vs_main"
//! fragment = "fs_main"
//! input = [{ semantic = "POSITION", format = "float32x3" }]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{ElementFormat, GpuError, InputElement, TechniqueId};

/// Profile the bundled manifests are written for.
pub const EFFECT_PROFILE: &str = "wgsl";

#[derive(Debug, Clone, Deserialize)]
pub struct EffectManifest
{
        pub profile: String,
        pub source: PathBuf,
        #[serde(default, rename = "technique")]
        pub techniques: Vec<TechniqueDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TechniqueDesc
{
        pub name: String,
        #[serde(default, rename = "pass")]
        pub passes: Vec<PassDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassDesc
{
        pub name: String,
        pub vertex: String,
        pub fragment: String,
        /// Input signature of the vertex entry point, in location order.
        #[serde(default, rename = "input")]
        pub inputs: Vec<SignatureElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignatureElement
{
        pub semantic: String,
        pub format: ElementFormat,
}

impl PassDesc
{
        /// Matches `elements` against this pass' input signature and returns
        /// the shader location of each element.
        ///
        /// Every signature entry must be fed by exactly one element with the
        /// same semantic (case-insensitive) and format.
        pub fn signature_locations(
                &self,
                elements: &[InputElement],
        ) -> Result<Vec<u32>, String>
        {
                let mut locations = Vec::with_capacity(elements.len());

                for element in elements
                {
                        let location = self
                                .inputs
                                .iter()
                                .position(|input| {
                                        input.semantic.eq_ignore_ascii_case(element.semantic)
                                })
                                .ok_or_else(|| {
                                        format!(
                                                "pass `{}` has no input `{}`",
                                                self.name, element.semantic
                                        )
                                })?;

                        let expected = self.inputs[location].format;

                        if expected != element.format
                        {
                                return Err(format!(
                                        "input `{}` of pass `{}` is {:?}, layout provides {:?}",
                                        element.semantic, self.name, expected, element.format
                                ));
                        }

                        if locations.contains(&(location as u32))
                        {
                                return Err(format!("input `{}` bound twice", element.semantic));
                        }

                        locations.push(location as u32);
                }

                if locations.len() != self.inputs.len()
                {
                        return Err(format!(
                                "pass `{}` expects {} inputs, layout provides {}",
                                self.name,
                                self.inputs.len(),
                                locations.len()
                        ));
                }

                Ok(locations)
        }
}

/// A parsed manifest together with its shader source.
#[derive(Debug, Clone)]
pub struct EffectBundle
{
        pub path: PathBuf,
        pub manifest: EffectManifest,
        pub source: String,
}

impl EffectBundle
{
        /// Reads the manifest at `path` and the source file it references
        /// (relative to the manifest's directory).
        pub fn load(path: &Path) -> Result<Self, GpuError>
        {
                let text = read_resource(path)?;

                let manifest = parse_manifest(path, &text)?;

                let source_path = path
                        .parent()
                        .map(|dir| dir.join(&manifest.source))
                        .unwrap_or_else(|| manifest.source.clone());

                let source = read_resource(&source_path)?;

                Self::from_parts(path, manifest, source)
        }

        /// Builds a bundle from an in-memory manifest and source.
        pub fn parse(
                path: &Path,
                manifest: &str,
                source: impl Into<String>,
        ) -> Result<Self, GpuError>
        {
                let manifest = parse_manifest(path, manifest)?;

                Self::from_parts(path, manifest, source.into())
        }

        fn from_parts(
                path: &Path,
                manifest: EffectManifest,
                source: String,
        ) -> Result<Self, GpuError>
        {
                if manifest.techniques.is_empty()
                {
                        return Err(GpuError::EffectCompilation {
                                path: path.to_path_buf(),
                                reason: "no techniques declared".to_string(),
                        });
                }

                Ok(Self {
                        path: path.to_path_buf(),
                        manifest,
                        source,
                })
        }

        pub fn check_profile(
                &self,
                profile: &str,
        ) -> Result<(), GpuError>
        {
                if self.manifest.profile != profile
                {
                        return Err(GpuError::EffectCompilation {
                                path: self.path.clone(),
                                reason: format!(
                                        "written for profile `{}`, requested `{}`",
                                        self.manifest.profile, profile
                                ),
                        });
                }

                Ok(())
        }

        pub fn find_technique(
                &self,
                name: &str,
        ) -> Result<TechniqueId, GpuError>
        {
                self.manifest
                        .techniques
                        .iter()
                        .position(|t| t.name == name)
                        .map(TechniqueId)
                        .ok_or_else(|| GpuError::TechniqueNotFound(name.to_string()))
        }

        pub fn technique(
                &self,
                id: TechniqueId,
        ) -> Option<&TechniqueDesc>
        {
                self.manifest.techniques.get(id.0)
        }

        pub fn pass_count(
                &self,
                id: TechniqueId,
        ) -> usize
        {
                self.technique(id).map_or(0, |t| t.passes.len())
        }

        pub fn pass(
                &self,
                id: TechniqueId,
                index: usize,
        ) -> Result<&PassDesc, GpuError>
        {
                let count = self.pass_count(id);

                self.technique(id)
                        .and_then(|t| t.passes.get(index))
                        .ok_or(GpuError::PassOutOfRange {
                                pass: index,
                                count,
                        })
        }
}

fn read_resource(path: &Path) -> Result<String, GpuError>
{
        std::fs::read_to_string(path).map_err(|e| match e.kind()
        {
                std::io::ErrorKind::NotFound => GpuError::ResourceNotFound(path.to_path_buf()),
                _ => GpuError::EffectCompilation {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                },
        })
}

fn parse_manifest(
        path: &Path,
        text: &str,
) -> Result<EffectManifest, GpuError>
{
        toml::from_str(text).map_err(|e| GpuError::EffectCompilation {
                path: path.to_path_buf(),
                reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests
{
        use super::*;

        const MANIFEST: &str = r#"
profile = "wgsl"
source = "triangle.wgsl"

[[technique]]
name = "Outline"

[[technique]]
name = "Render"

[[technique.pass]]
name = "P0"
vertex = "vs_main"
fragment = "fs_main"
input = [{ semantic = "POSITION", format = "float32x3" }]

[[technique.pass]]
name = "P1"
vertex = "vs_main"
fragment = "fs_tint"
input = [{ semantic = "POSITION", format = "float32x3" }]
"#;

        const POSITION: InputElement = InputElement {
                semantic: "position",
                format: ElementFormat::Float32x3,
                offset: 0,
        };

        fn bundle() -> EffectBundle
        {
                EffectBundle::parse(Path::new("test.toml"), MANIFEST, "// wgsl").unwrap()
        }

        #[test]
        fn techniques_and_passes_resolve_by_name_and_order()
        {
                let bundle = bundle();

                let render = bundle.find_technique("Render").unwrap();
                assert_eq!(render, TechniqueId(1));
                assert_eq!(bundle.pass_count(render), 2);
                assert_eq!(bundle.pass(render, 1).unwrap().fragment, "fs_tint");

                let outline = bundle.find_technique("Outline").unwrap();
                assert_eq!(bundle.pass_count(outline), 0);
        }

        #[test]
        fn unknown_technique_and_pass_are_errors()
        {
                let bundle = bundle();

                assert!(matches!(
                        bundle.find_technique("Missing"),
                        Err(GpuError::TechniqueNotFound(name)) if name == "Missing"
                ));
                assert!(matches!(
                        bundle.pass(TechniqueId(1), 2),
                        Err(GpuError::PassOutOfRange {
                                pass: 2,
                                count: 2
                        })
                ));
        }

        #[test]
        fn profile_mismatch_is_a_compilation_error()
        {
                let bundle = bundle();

                assert!(bundle.check_profile(EFFECT_PROFILE).is_ok());
                assert!(matches!(
                        bundle.check_profile("fx_4_0"),
                        Err(GpuError::EffectCompilation {
                                ..
                        })
                ));
        }

        #[test]
        fn signature_matching_checks_semantic_format_and_coverage()
        {
                let bundle = bundle();
                let pass = bundle.pass(TechniqueId(1), 0).unwrap();

                assert_eq!(pass.signature_locations(&[POSITION]), Ok(vec![0]));

                let wrong_format = InputElement {
                        format: ElementFormat::Float32x4,
                        ..POSITION
                };
                assert!(pass.signature_locations(&[wrong_format]).is_err());

                let unknown = InputElement {
                        semantic: "COLOR",
                        ..POSITION
                };
                assert!(pass.signature_locations(&[unknown]).is_err());

                assert!(pass.signature_locations(&[]).is_err());
        }

        #[test]
        fn missing_manifest_is_resource_not_found()
        {
                let path = Path::new("does/not/exist/effect.toml");

                assert!(matches!(
                        EffectBundle::load(path),
                        Err(GpuError::ResourceNotFound(p)) if p == path
                ));
        }

        #[test]
        fn bundled_triangle_effect_loads()
        {
                let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/effects/triangle.toml");

                let bundle = EffectBundle::load(&path).unwrap();
                let render = bundle.find_technique("Render").unwrap();

                assert!(bundle.check_profile(EFFECT_PROFILE).is_ok());
                assert_eq!(bundle.pass_count(render), 1);
                assert!(bundle.source.contains("vs_main"));
        }

        #[test]
        fn manifest_without_techniques_is_rejected()
        {
                let result = EffectBundle::parse(
                        Path::new("empty.toml"),
                        "profile = \"wgsl\"\nsource = \"x.wgsl\"\n",
                        "",
                );

                assert!(matches!(
                        result,
                        Err(GpuError::EffectCompilation {
                                ..
                        })
                ));
        }
}
