//! Fullscreen VHS passes: noise, blur pyramid, smear and composite.

/// Render a fullscreen effect into `target`. `load` is `Clear(BLACK)` for
/// passes that overwrite the target and `Load` for passes that blend over it.
pub fn render_fullscreen_effect(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    label: &str,
    load: wgpu::LoadOp<wgpu::Color>,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

/// Render the noise buffer from the scroll band and stripe/speck texture.
pub fn render_noise_gen(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        target,
        pipeline,
        bind_group,
        "VHS Noise Gen",
        wgpu::LoadOp::Clear(wgpu::Color::BLACK),
    );
}

/// Render one downsample step of the blur pyramid.
pub fn render_downsample(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    label: &str,
) {
    render_fullscreen_effect(
        encoder,
        target,
        pipeline,
        bind_group,
        label,
        wgpu::LoadOp::Clear(wgpu::Color::BLACK),
    );
}

/// Blend a deeper pyramid level over the next shallower one.
pub fn render_upsample(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        target,
        pipeline,
        bind_group,
        "VHS Upsample",
        wgpu::LoadOp::Load,
    );
}

/// Render one directional smear pass.
pub fn render_smear(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        target,
        pipeline,
        bind_group,
        "VHS Smear",
        wgpu::LoadOp::Clear(wgpu::Color::BLACK),
    );
}

/// Render the final composite into the destination.
pub fn render_composite(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    render_fullscreen_effect(
        encoder,
        target,
        pipeline,
        bind_group,
        "VHS Composite",
        wgpu::LoadOp::Clear(wgpu::Color::BLACK),
    );
}
