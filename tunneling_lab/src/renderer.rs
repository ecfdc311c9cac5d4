//! Tunneling canvas rendering
//!
//! Uploads a [`Scene`] as instanced quads: rectangles for the ground and
//! barrier, an outlined disk for the particle.

use common::{Camera2D, CameraUniform, GraphicsContext};
use wgpu::util::DeviceExt;

use crate::scene::{Disk, Rect, Scene};

/// Instance data for filled rectangles
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RectInstance {
    pub center: [f32; 2],
    pub half_extents: [f32; 2],
    pub color: [f32; 4],
}

impl RectInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2,  // center
        2 => Float32x2,  // half extents
        3 => Float32x4,  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&Rect> for RectInstance {
    fn from(rect: &Rect) -> Self {
        Self {
            center: rect.center(),
            half_extents: rect.half_extents(),
            color: rect.color,
        }
    }
}

/// Instance data for outlined disks
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DiskInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub outline_width: f32,
    pub fill: [f32; 4],
    pub outline: [f32; 4],
}

impl DiskInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2,  // center
        2 => Float32x2,  // radius, outline width
        3 => Float32x4,  // fill
        4 => Float32x4,  // outline
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiskInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&Disk> for DiskInstance {
    fn from(disk: &Disk) -> Self {
        Self {
            center: disk.center,
            radius: disk.radius,
            outline_width: disk.outline_width,
            fill: disk.fill,
            outline: disk.outline,
        }
    }
}

/// Unit quad corner shared by both pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Sub-rectangle of the surface to draw the canvas into, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

pub struct TunnelingRenderer {
    rect_pipeline: wgpu::RenderPipeline,
    disk_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    rect_buffer: wgpu::Buffer,
    disk_buffer: wgpu::Buffer,
    max_rects: usize,
    num_rects: u32,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl TunnelingRenderer {
    pub fn new(ctx: &GraphicsContext, max_rects: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Tunneling Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tunneling.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
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

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Tunneling Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let rect_pipeline = instanced_pipeline(
            device,
            &pipeline_layout,
            &shader,
            ctx.config.format,
            "Rect Pipeline",
            ("vs_rect", "fs_rect"),
            RectInstance::layout(),
        );
        let disk_pipeline = instanced_pipeline(
            device,
            &pipeline_layout,
            &shader,
            ctx.config.format,
            "Disk Pipeline",
            ("vs_disk", "fs_disk"),
            DiskInstance::layout(),
        );

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let rect_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Rect Instance Buffer"),
            size: (std::mem::size_of::<RectInstance>() * max_rects) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let disk_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Disk Instance Buffer"),
            size: std::mem::size_of::<DiskInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            rect_pipeline,
            disk_pipeline,
            quad_buffer,
            rect_buffer,
            disk_buffer,
            max_rects,
            num_rects: 0,
            camera_buffer,
            camera_bind_group,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn update_scene(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        let rects: Vec<RectInstance> = scene
            .rects
            .iter()
            .take(self.max_rects)
            .map(RectInstance::from)
            .collect();
        self.num_rects = rects.len() as u32;

        queue.write_buffer(&self.rect_buffer, 0, bytemuck::cast_slice(&rects));
        let disk = DiskInstance::from(&scene.particle);
        queue.write_buffer(&self.disk_buffer, 0, bytemuck::cast_slice(&[disk]));
    }

    /// Clear the target and draw the last uploaded scene into `viewport`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        viewport: Viewport,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Canvas Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.08,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if viewport.width < 1.0 || viewport.height < 1.0 {
            return;
        }
        render_pass.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height, 0.0, 1.0);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));

        render_pass.set_pipeline(&self.rect_pipeline);
        render_pass.set_vertex_buffer(1, self.rect_buffer.slice(..));
        render_pass.draw(0..6, 0..self.num_rects);

        render_pass.set_pipeline(&self.disk_pipeline);
        render_pass.set_vertex_buffer(1, self.disk_buffer.slice(..));
        render_pass.draw(0..6, 0..1);
    }
}

fn instanced_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    (vs_entry, fs_entry): (&str, &str),
    instance_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: vs_entry,
            buffers: &[QuadVertex::layout(), instance_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fs_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent::OVER,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BARRIER_COLOR;

    #[test]
    fn test_instance_sizes_match_layouts() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
        assert_eq!(std::mem::size_of::<DiskInstance>(), 48);
    }

    #[test]
    fn test_rect_instance_from_bounds() {
        let rect = Rect {
            min: [380.0, 20.0],
            max: [420.0, 400.0],
            color: BARRIER_COLOR,
        };
        let instance = RectInstance::from(&rect);
        assert_eq!(instance.center, [400.0, 210.0]);
        assert_eq!(instance.half_extents, [20.0, 190.0]);
        assert_eq!(instance.color, BARRIER_COLOR);
    }
}
