use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};
use fieldview_common::{Color, GroupId};
use fieldview_render::RenderView;
use fieldview_stream::{PrimitiveGroup, RenderBatch};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct PointVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Vertex data for one primitive group.
fn point_vertices(group: &PrimitiveGroup) -> Vec<PointVertex> {
    let color = group.color.to_f32_array();
    group
        .points
        .iter()
        .map(|p| PointVertex {
            position: p.to_vec3().to_array(),
            color,
        })
        .collect()
}

/// Which batch groups still need uploading and which cached groups are gone.
fn plan_sync(
    cached: &HashSet<GroupId>,
    batch: &RenderBatch,
) -> (Vec<GroupId>, Vec<GroupId>) {
    let live: HashSet<GroupId> = batch.groups().iter().map(|g| g.id).collect();
    let to_upload = batch
        .groups()
        .iter()
        .map(|g| g.id)
        .filter(|id| !cached.contains(id))
        .collect();
    let to_release = cached.iter().filter(|id| !live.contains(id)).copied().collect();
    (to_upload, to_release)
}

fn clear_color(c: Color) -> wgpu::Color {
    let [r, g, b, a] = c.to_f32_array();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

struct GpuGroup {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// wgpu-based point cloud renderer.
pub struct WgpuRenderer {
    point_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    groups: HashMap<GroupId, GpuGroup>,
    depth_texture: wgpu::TextureView,
    background: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        background: Color,
    ) -> Self {
        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::POINT_SHADER.into()),
        });

        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &point_shader,
                entry_point: Some("vs_point"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PointVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &point_shader,
                entry_point: Some("fs_point"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            point_pipeline,
            uniform_buffer,
            uniform_bind_group,
            groups: HashMap::new(),
            depth_texture,
            background: clear_color(background),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Number of primitive groups currently resident on the GPU.
    pub fn resident_groups(&self) -> usize {
        self.groups.len()
    }

    /// Upload groups appended since the last sync and drop buffers for groups
    /// that are no longer in the batch. Returns `(uploaded, released)`.
    pub fn sync_batch(&mut self, device: &wgpu::Device, batch: &RenderBatch) -> (usize, usize) {
        let cached: HashSet<GroupId> = self.groups.keys().copied().collect();
        let (to_upload, to_release) = plan_sync(&cached, batch);

        for id in &to_release {
            self.groups.remove(id);
        }
        for id in &to_upload {
            let Some(group) = batch.group(*id) else {
                continue;
            };
            let vertices = point_vertices(group);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("point_group_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            self.groups.insert(
                *id,
                GpuGroup {
                    vertex_buffer,
                    vertex_count: vertices.len() as u32,
                },
            );
        }

        if !to_upload.is_empty() || !to_release.is_empty() {
            tracing::trace!(
                uploaded = to_upload.len(),
                released = to_release.len(),
                resident = self.groups.len(),
                "gpu batch synced"
            );
        }
        (to_upload.len(), to_release.len())
    }

    /// Render one frame: every resident group of `batch` as points.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        render_view: &RenderView,
        batch: &RenderBatch,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: render_view.view_projection().to_cols_array_2d(),
            }),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.point_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for group in batch.groups() {
                let Some(gpu) = self.groups.get(&group.id) else {
                    continue;
                };
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                pass.draw(0..gpu.vertex_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldview_field::PointSource;
    use fieldview_stream::{BatchConfig, PointBatcher};

    fn batcher() -> PointBatcher {
        let source = PointSource::from_fn("sum", (2, 2, 1.0, 1.0), |x, y| x + y).unwrap();
        PointBatcher::new(
            source,
            BatchConfig {
                count_per_tick: 4,
                color: Color::rgb(255, 0, 0),
            },
        )
    }

    #[test]
    fn vertices_carry_position_and_color() {
        let mut b = batcher();
        let id = b.step().unwrap();
        let verts = point_vertices(b.batch().group(id).unwrap());
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].position, [-1.0, -2.0, -1.0]);
        assert_eq!(verts[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn plan_sync_uploads_only_new_groups() {
        let mut b = batcher();
        let first = b.step().unwrap();
        let cached: HashSet<GroupId> = [first].into();
        let second = b.step().unwrap();

        let (upload, release) = plan_sync(&cached, b.batch());
        assert_eq!(upload, vec![second]);
        assert!(release.is_empty());
    }

    #[test]
    fn plan_sync_releases_cleared_groups() {
        let mut b = batcher();
        let first = b.step().unwrap();
        let cached: HashSet<GroupId> = [first].into();
        b.reset(
            PointSource::from_fn("product", (2, 2, 1.0, 1.0), |x, y| x * y).unwrap(),
            true,
        );

        let (upload, release) = plan_sync(&cached, b.batch());
        assert!(upload.is_empty());
        assert_eq!(release, vec![first]);
    }

    #[test]
    fn background_converts_to_unit_range() {
        let c = clear_color(Color::rgb(255, 0, 255));
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.0, 1.0, 1.0));
    }
}
