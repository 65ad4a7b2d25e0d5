use anyhow::Context;
use winit::event::WindowEvent;
use winit::window::Window;

use prism_engine::coords::Color;
use prism_engine::core::{App, AppControl, FrameCtx, SetupCtx};
use prism_engine::input::{EventReceiver, HostBridge, InputEvent};
use prism_engine::render::{
    slider_overlay, DynamicMesh, GpuMesh, GpuTexture, Mesh, MeshDraw, MeshRenderer, ShaderDocument,
    ShaderProgram,
};
use prism_engine::texture::{LoadTicket, TextureVault};

/// GPU objects created during setup.
struct Scene {
    renderer: MeshRenderer,
    triangle: GpuMesh,
    overlay: DynamicMesh,
}

/// The bootstrap triangle, the slider panel and the event listener.
pub struct ViewerApp {
    bridge: HostBridge,
    events: EventReceiver,
    vault: TextureVault<GpuTexture>,
    texture: Option<String>,
    ticket: Option<LoadTicket>,
    scene: Option<Scene>,
}

impl ViewerApp {
    pub fn new(
        bridge: HostBridge,
        events: EventReceiver,
        vault: TextureVault<GpuTexture>,
        texture: Option<String>,
    ) -> Self {
        Self {
            bridge,
            events,
            vault,
            texture,
            ticket: None,
            scene: None,
        }
    }

    /// Stands in for the simulation side: reports every bridged event.
    fn drain_events(&mut self) {
        for event in self.events.drain() {
            match event {
                InputEvent::PointerMove { .. } => log::trace!("{:?}", event.legacy_code()),
                _ => log::info!("{event:?} => {:?}", event.legacy_code()),
            }
        }
    }

}

/// Reports the texture load once it resolves.
fn check_ticket(slot: &mut Option<LoadTicket>) {
    let Some(ticket) = slot.as_mut() else { return };
    let failure = match ticket.try_outcome() {
        None => return,
        Some(outcome) => outcome.as_ref().err().map(ToString::to_string),
    };
    match failure {
        None => log::debug!("texture {} bound to the triangle", ticket.name()),
        Some(e) => log::warn!("drawing untextured: {e}"),
    }
    *slot = None;
}

impl App for ViewerApp {
    fn on_setup(&mut self, ctx: &SetupCtx<'_>) -> anyhow::Result<()> {
        let program = ShaderProgram::from_document(
            &ShaderDocument::builtin(),
            ShaderDocument::VERTEX_ID,
            ShaderDocument::FRAGMENT_ID,
        )
        .context("failed to build the shader program")?;

        let renderer = MeshRenderer::new(ctx.device, ctx.queue, &program);
        let triangle = GpuMesh::upload(ctx.device, "bootstrap triangle", &Mesh::triangle())
            .context("failed to upload the bootstrap triangle")?;

        self.scene = Some(Scene {
            renderer,
            triangle,
            overlay: DynamicMesh::new("slider overlay"),
        });

        self.bridge.layout(ctx.window.viewport());
        self.bridge.announce_sliders();

        if let Some(name) = self.texture.as_deref() {
            self.ticket = Some(self.vault.load(name));
        }
        Ok(())
    }

    fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> AppControl {
        self.bridge.handle_window_event(window, event);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.drain_events();

        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        {
            let device = ctx.gpu.device();
            let queue = ctx.gpu.queue();
            let layout = scene.renderer.texture_layout();
            self.vault
                .poll(|name, image| GpuTexture::from_rgba(device, queue, layout, name, &image));

            let overlay = slider_overlay(self.bridge.sliders());
            if let Err(e) = scene.overlay.write(device, queue, &overlay) {
                log::error!("slider overlay: {e}");
            }
        }
        check_ticket(&mut self.ticket);

        // Until the upload lands (or if it failed) the triangle draws untextured.
        let texture = self
            .texture
            .as_deref()
            .and_then(|name| self.vault.bind(name).ok());

        let Scene {
            renderer,
            triangle,
            overlay,
        } = scene;

        ctx.render(Color::BLACK, |rctx, target| {
            let mut draws = vec![MeshDraw {
                mesh: &*triangle,
                texture,
            }];
            if let Some(overlay) = overlay.gpu() {
                draws.push(MeshDraw::new(overlay));
            }
            renderer.render(rctx, target, &draws);
        })
    }
}
