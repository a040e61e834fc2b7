use cubespin_render::ShaderSources;

/// WGSL vertex stage: transforms positions and computes per-vertex light intensity.
///
/// With lighting on: ambient + diffuse + specular against a camera-space point
/// light. Objects translated to the right of the view axis get a 1.2x boost.
/// With lighting off the intensity is exactly 1.
pub const VERTEX_SHADER: &str = r#"
struct DrawUniforms {
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    light_position: vec4<f32>,
    // x: lighting enabled (0 or 1)
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: DrawUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) light: f32,
};

const AMBIENT: f32 = 0.3;
const DIFFUSE: f32 = 0.7;
const SPECULAR: f32 = 0.5;
const SHININESS: f32 = 32.0;
const RIGHT_SIDE_BOOST: f32 = 1.2;

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let view_pos = uniforms.model_view * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.projection * view_pos;
    out.color = vertex.color;
    out.light = 1.0;

    if (uniforms.params.x > 0.5) {
        let normal = normalize((uniforms.model_view * vec4<f32>(vertex.normal, 0.0)).xyz);
        let to_light = normalize(uniforms.light_position.xyz - view_pos.xyz);
        let to_eye = normalize(-view_pos.xyz);
        let diffuse = max(dot(normal, to_light), 0.0);
        let specular = pow(max(dot(to_eye, reflect(-to_light, normal)), 0.0), SHININESS);
        var intensity = AMBIENT + DIFFUSE * diffuse + SPECULAR * specular;
        if (uniforms.model_view[3].x > 0.0) {
            intensity = intensity * RIGHT_SIDE_BOOST;
        }
        out.light = intensity;
    }
    return out;
}
"#;

/// WGSL fragment stage: colour scaled by the interpolated light intensity.
pub const FRAGMENT_SHADER: &str = r#"
struct FragmentInput {
    @location(0) color: vec4<f32>,
    @location(1) light: f32,
};

@fragment
fn fs_main(input: FragmentInput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color.rgb * input.light, input.color.a);
}
"#;

/// The fixed program every cube is drawn with.
pub const CUBE_SHADERS: ShaderSources = ShaderSources {
    vertex: VERTEX_SHADER,
    fragment: FRAGMENT_SHADER,
};
