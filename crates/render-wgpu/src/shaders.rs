/// WGSL shader for coloured point primitives.
pub const POINT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct PointInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct PointOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_point(vertex: PointInput) -> PointOutput {
    var out: PointOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_point(in: PointOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
