use super::helpers;
use wgpu;

/// Depth and (when multisampling) color attachments sized to the surface.
pub(crate) struct FrameTargets {
    pub(crate) sample_count: u32,
    color_format: wgpu::TextureFormat,
    depth_tex: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl FrameTargets {
    pub(crate) fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let (depth_tex, depth_view) =
            helpers::create_depth_texture(device, "depth_tex", width, height, sample_count);
        let msaa = helpers::create_msaa_texture(device, color_format, width, height, sample_count);
        Self { sample_count, color_format, depth_tex, depth_view, msaa }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_tex.destroy();
        if let Some((tex, _)) = &self.msaa {
            tex.destroy();
        }
        *self = Self::new(device, self.color_format, width, height, self.sample_count);
    }

    /// Color view to draw into and the resolve target, given the swapchain view.
    pub(crate) fn color_attachment<'a>(
        &'a self,
        frame_view: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa {
            Some((_, msaa_view)) => (msaa_view, Some(frame_view)),
            None => (frame_view, None),
        }
    }
}
