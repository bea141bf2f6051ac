use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the full-surface quad used by every downsampling pass.
pub(crate) fn compile_blit_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mip blit vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(BLIT_VERTEX_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the fragment stage that samples the previous mip level.
pub(crate) fn compile_blit_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mip blit fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(BLIT_FRAGMENT_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Four-vertex triangle strip covering the target; `v_uv` has its origin at the top-left.
const BLIT_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[4] = vec2[4](
    vec2(-1.0, 1.0),
    vec2(-1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(1.0, -1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = vec2(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D mip_source_texture;
layout(set = 0, binding = 1) uniform sampler mip_source_sampler;

void main() {
    outColor = texture(sampler2D(mip_source_texture, mip_source_sampler), v_uv);
}
";
