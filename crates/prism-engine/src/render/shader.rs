//! Shader blocks, compilation and program linking.
//!
//! Sources are embedded blocks tagged with an id and a type string. The type
//! decides the stage; compiling parses and validates the WGSL with naga, and
//! linking checks that the two stages fit together before any GPU object
//! exists.

use std::borrow::Cow;

use thiserror::Error;

/// Type string of a vertex shader block.
pub const VERTEX_SHADER_TYPE: &str = "x-shader/x-vertex";
/// Type string of a fragment shader block.
pub const FRAGMENT_SHADER_TYPE: &str = "x-shader/x-fragment";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader block `{id}` not found")]
    MissingBlock { id: String },

    #[error("shader block `{id}` has unknown type `{ty}`")]
    UnknownType { id: String, ty: String },

    #[error("shader `{id}` failed to compile:\n{log}")]
    Compile { id: String, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },
}

/// Pipeline stage of a shader block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Fixed type-string → stage mapping.
    pub fn from_type(ty: &str) -> Option<Self> {
        match ty {
            VERTEX_SHADER_TYPE => Some(ShaderKind::Vertex),
            FRAGMENT_SHADER_TYPE => Some(ShaderKind::Fragment),
            _ => None,
        }
    }

    /// Entry point every block of this kind must define.
    pub const fn entry_point(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vs_main",
            ShaderKind::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderKind::Vertex => naga::ShaderStage::Vertex,
            ShaderKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// One embedded shader source.
#[derive(Debug, Clone)]
pub struct ShaderBlock {
    pub id: Cow<'static, str>,
    pub ty: Cow<'static, str>,
    pub source: Cow<'static, str>,
}

impl ShaderBlock {
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        ty: impl Into<Cow<'static, str>>,
        source: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
            source: source.into(),
        }
    }
}

/// A set of shader blocks addressable by id.
#[derive(Debug, Clone, Default)]
pub struct ShaderDocument {
    blocks: Vec<ShaderBlock>,
}

impl ShaderDocument {
    /// Id of the built-in vertex block.
    pub const VERTEX_ID: &'static str = "vs";
    /// Id of the built-in fragment block.
    pub const FRAGMENT_ID: &'static str = "fs";

    pub fn new(blocks: Vec<ShaderBlock>) -> Self {
        Self { blocks }
    }

    /// The mesh program shipped with the engine.
    pub fn builtin() -> Self {
        Self::new(vec![
            ShaderBlock::new(
                Self::VERTEX_ID,
                VERTEX_SHADER_TYPE,
                include_str!("shaders/mesh_vs.wgsl"),
            ),
            ShaderBlock::new(
                Self::FRAGMENT_ID,
                FRAGMENT_SHADER_TYPE,
                include_str!("shaders/mesh_fs.wgsl"),
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Result<&ShaderBlock, ShaderError> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ShaderError::MissingBlock { id: id.to_string() })
    }
}

/// A parsed and validated shader stage.
#[derive(Debug)]
pub struct CompiledShader {
    id: String,
    kind: ShaderKind,
    source: Cow<'static, str>,
    module: naga::Module,
}

impl CompiledShader {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }
}

/// Compiles one block. Failures are logged with the raw compiler output.
pub fn compile(block: &ShaderBlock) -> Result<CompiledShader, ShaderError> {
    let kind = ShaderKind::from_type(&block.ty).ok_or_else(|| ShaderError::UnknownType {
        id: block.id.to_string(),
        ty: block.ty.to_string(),
    })?;

    let source = block.source.clone();
    let fail = |log: String| {
        log::error!("shader `{}` failed to compile:\n{log}", block.id);
        ShaderError::Compile {
            id: block.id.to_string(),
            log,
        }
    };

    let module = naga::front::wgsl::parse_str(&source).map_err(|e| fail(e.emit_to_string(&source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| fail(e.emit_to_string(&source)))?;

    log::debug!("compiled {kind:?} shader `{}`", block.id);

    Ok(CompiledShader {
        id: block.id.to_string(),
        kind,
        source,
        module,
    })
}

/// Links a vertex and a fragment stage into a program.
///
/// Checks that each module exposes its stage's entry point and that every
/// location the fragment stage reads is written by the vertex stage.
pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<ShaderProgram, ShaderError> {
    let fail = |log: String| {
        log::error!("program failed to link:\n{log}");
        ShaderError::Link { log }
    };

    if vertex.kind != ShaderKind::Vertex {
        return Err(fail(format!("`{}` is not a vertex shader", vertex.id)));
    }
    if fragment.kind != ShaderKind::Fragment {
        return Err(fail(format!("`{}` is not a fragment shader", fragment.id)));
    }

    let vs_entry = find_entry(&vertex).ok_or_else(|| {
        fail(format!("`{}` has no vertex entry point `{}`", vertex.id, ShaderKind::Vertex.entry_point()))
    })?;
    let fs_entry = find_entry(&fragment).ok_or_else(|| {
        fail(format!(
            "`{}` has no fragment entry point `{}`",
            fragment.id,
            ShaderKind::Fragment.entry_point()
        ))
    })?;

    let mut produced = Vec::new();
    if let Some(result) = &vs_entry.function.result {
        collect_locations(&vertex.module, result.ty, result.binding.as_ref(), &mut produced);
    }

    let mut consumed = Vec::new();
    for arg in &fs_entry.function.arguments {
        collect_locations(&fragment.module, arg.ty, arg.binding.as_ref(), &mut consumed);
    }

    let missing: Vec<u32> = consumed
        .into_iter()
        .filter(|loc| !produced.contains(loc))
        .collect();
    if !missing.is_empty() {
        return Err(fail(format!(
            "fragment `{}` reads location(s) {missing:?} not written by vertex `{}`",
            fragment.id, vertex.id
        )));
    }

    log::debug!("linked program `{}` + `{}`", vertex.id, fragment.id);
    Ok(ShaderProgram { vertex, fragment })
}

fn find_entry(shader: &CompiledShader) -> Option<&naga::EntryPoint> {
    shader
        .module
        .entry_points
        .iter()
        .find(|ep| ep.stage == shader.kind.naga_stage() && ep.name == shader.kind.entry_point())
}

/// Pushes the user locations carried by a value, looking one level into
/// structs. Built-ins are skipped.
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(*location),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(*location);
                    }
                }
            }
        }
    }
}

/// A linked vertex + fragment pair, used for the lifetime of the process.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex: CompiledShader,
    fragment: CompiledShader,
}

/// GPU modules created from a [`ShaderProgram`].
#[derive(Debug)]
pub struct ProgramModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compiles and links the blocks `vs_id` and `fs_id` of `doc`.
    pub fn from_document(doc: &ShaderDocument, vs_id: &str, fs_id: &str) -> Result<Self, ShaderError> {
        let vertex = compile(doc.get(vs_id)?)?;
        let fragment = compile(doc.get(fs_id)?)?;
        link(vertex, fragment)
    }

    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn create_modules(&self, device: &wgpu::Device) -> ProgramModules {
        let create = |shader: &CompiledShader| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&shader.id),
                source: wgpu::ShaderSource::Wgsl(shader.source.clone()),
            })
        };

        ProgramModules {
            vertex: create(&self.vertex),
            fragment: create(&self.fragment),
        }
    }
}
