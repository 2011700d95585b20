use std::sync::Arc;

use tracing::{error, info};
use winit::window::Window;

use crate::error::SetupError;
use crate::math::{LIGHT_CUBE_SIZE, SurfaceMesh, light_cube_vertices};
use crate::renderer::camera::SceneUniform;
use crate::renderer::mesh_buffers::{
    MeshBuffers, POSITION_ATTRS, UV_ONLY_ATTRS, surface_layouts, vec2_buffer_layout,
    vec3_buffer_layout,
};
use crate::renderer::texture::TextureSlots;
use crate::texture::DecodedImage;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

const OPAQUE_DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::Less;
/// Wireframe lines lie on the surface triangles, so ties must pass.
const OVERLAY_DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

struct PipelineDesc<'a> {
    label: &'a str,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth: Option<wgpu::CompareFunction>,
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pipeline_surface: wgpu::RenderPipeline,
    pipeline_light: wgpu::RenderPipeline,
    pipeline_wireframe: wgpu::RenderPipeline,
    pipeline_uv_quad: wgpu::RenderPipeline,
    pipeline_uv_lines: wgpu::RenderPipeline,
    pipeline_uv_marker: wgpu::RenderPipeline,

    scene_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    light_bind_group: wgpu::BindGroup,

    pub textures: TextureSlots,
    pub mesh: MeshBuffers,

    depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, SetupError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SetupError::NoAdapter)?;

        let info = adapter.get_info();
        info!(adapter = %info.name, backend = ?info.backend, "graphics adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(SetupError::NoAdapter)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });
        if let Some(err) = device.pop_error_scope().await {
            error!("shader validation failed: {}", err);
            return Err(SetupError::Shader(err.to_string()));
        }

        let scene_buffer = uniform_buffer(&device, "Scene Uniform Buffer");
        let light_buffer = uniform_buffer(&device, "Light Uniform Buffer");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let scene_bind_group = uniform_bind_group(&device, &uniform_layout, &scene_buffer, "Scene Bind Group");
        let light_bind_group = uniform_bind_group(&device, &uniform_layout, &light_buffer, "Light Bind Group");

        let textures = TextureSlots::new(&device, &queue);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, textures.layout()],
            push_constant_ranges: &[],
        });

        let create = |desc: PipelineDesc| {
            create_pipeline(&device, &pipeline_layout, &shader, config.format, desc)
        };

        let surface_buffers = surface_layouts();
        let position_buffer = [vec3_buffer_layout(&POSITION_ATTRS)];
        let uv_buffer = [vec2_buffer_layout(&UV_ONLY_ATTRS)];

        let pipeline_surface = create(PipelineDesc {
            label: "Surface Pipeline",
            vs_entry: "vs_surface",
            fs_entry: "fs_surface",
            buffers: &surface_buffers,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: Some(OPAQUE_DEPTH_COMPARE),
        });

        let pipeline_light = create(PipelineDesc {
            label: "Light Pipeline",
            vs_entry: "vs_flat",
            fs_entry: "fs_light",
            buffers: &position_buffer,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth: Some(OPAQUE_DEPTH_COMPARE),
        });

        let pipeline_wireframe = create(PipelineDesc {
            label: "Wireframe Pipeline",
            vs_entry: "vs_flat",
            fs_entry: "fs_wireframe",
            buffers: &position_buffer,
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            depth: Some(OVERLAY_DEPTH_COMPARE),
        });

        let pipeline_uv_quad = create(PipelineDesc {
            label: "UV Quad Pipeline",
            vs_entry: "vs_uv_quad",
            fs_entry: "fs_uv_quad",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: None,
        });

        let pipeline_uv_lines = create(PipelineDesc {
            label: "UV Lines Pipeline",
            vs_entry: "vs_uv_lines",
            fs_entry: "fs_uv_lines",
            buffers: &uv_buffer,
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            depth: None,
        });

        let pipeline_uv_marker = create(PipelineDesc {
            label: "UV Marker Pipeline",
            vs_entry: "vs_uv_marker",
            fs_entry: "fs_uv_marker",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: None,
        });

        let cube = light_cube_vertices(LIGHT_CUBE_SIZE);
        let mesh = MeshBuffers::new(&device, &cube);
        mesh.upload_light_cube(&queue, &cube);

        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline_surface,
            pipeline_light,
            pipeline_wireframe,
            pipeline_uv_quad,
            pipeline_uv_lines,
            pipeline_uv_marker,
            scene_buffer,
            light_buffer,
            scene_bind_group,
            light_bind_group,
            textures,
            mesh,
            depth_texture,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = present_mode(enabled);
        self.surface.configure(&self.device, &self.config);
    }

    pub fn upload_mesh(&mut self, mesh: &SurfaceMesh) -> bool {
        self.mesh.upload(&self.queue, mesh)
    }

    pub fn upload_texture(&mut self, image: &DecodedImage) {
        self.textures.replace(&self.device, &self.queue, image);
    }

    pub fn update_uniforms(&self, scene: &SceneUniform, light: &SceneUniform) {
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*scene]));
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[*light]));
    }

    pub fn render_surface(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        show_wireframe: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Surface Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(1, self.textures.bind_group(), &[]);

        if self.mesh.index_count() > 0 {
            render_pass.set_pipeline(&self.pipeline_surface);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.positions.slice(..));
            render_pass.set_vertex_buffer(1, self.mesh.normals.slice(..));
            render_pass.set_vertex_buffer(2, self.mesh.tangents.slice(..));
            render_pass.set_vertex_buffer(3, self.mesh.bitangents.slice(..));
            render_pass.set_vertex_buffer(4, self.mesh.uvs.slice(..));
            render_pass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.mesh.index_count(), 0, 0..1);

            if show_wireframe {
                render_pass.set_pipeline(&self.pipeline_wireframe);
                render_pass.set_vertex_buffer(0, self.mesh.positions.slice(..));
                render_pass.set_index_buffer(self.mesh.grid_lines.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.mesh.grid_line_count(), 0, 0..1);
            }
        }

        render_pass.set_pipeline(&self.pipeline_light);
        render_pass.set_bind_group(0, &self.light_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh.light_cube.slice(..));
        render_pass.draw(0..self.mesh.light_vertex_count(), 0..1);
    }

    pub fn render_uv(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("UV Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        render_pass.set_bind_group(1, self.textures.bind_group(), &[]);

        render_pass.set_pipeline(&self.pipeline_uv_quad);
        render_pass.draw(0..6, 0..1);

        if self.mesh.uv_line_count() > 0 {
            render_pass.set_pipeline(&self.pipeline_uv_lines);
            render_pass.set_vertex_buffer(0, self.mesh.uvs.slice(..));
            render_pass.set_index_buffer(self.mesh.uv_lines.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.mesh.uv_line_count(), 0, 0..1);
        }

        render_pass.set_pipeline(&self.pipeline_uv_marker);
        render_pass.draw(0..6, 0..1);
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<SceneUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    desc: PipelineDesc,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(desc.vs_entry),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(desc.fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            ..Default::default()
        },
        depth_stencil: desc.depth.map(|depth_compare| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wireframe_depth_test_accepts_coplanar_lines() {
        assert!(matches!(
            OVERLAY_DEPTH_COMPARE,
            wgpu::CompareFunction::LessEqual | wgpu::CompareFunction::Equal | wgpu::CompareFunction::Always
        ));
        assert_ne!(OVERLAY_DEPTH_COMPARE, OPAQUE_DEPTH_COMPARE);
    }

    #[test]
    fn vsync_selects_present_mode() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
