use crate::PaintApp;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let canvas_rect = ui.available_rect_before_wrap();

            // Handle input
            app.handle_input(ctx, canvas_rect);

            // Render the canvas
            let painter = ui.painter_at(canvas_rect);
            app.render(&painter, canvas_rect);

            if app.tracker().active_count() > 0 {
                ctx.request_repaint();
            }
        });
}
