use crate::PaintApp;
use crate::gate::{DrawGateSource, GatePolicy};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Session");

            let detected = app.planes().surface_detected();
            ui.label(if detected {
                format!("Surface detected ({} planes)", app.planes().tracked_planes())
            } else {
                "No surface yet".to_owned()
            });
            ui.horizontal(|ui| {
                if ui.button("Detect plane").clicked() {
                    app.simulate_plane(1, 0);
                }
                if ui.button("Lose plane").clicked() {
                    app.simulate_plane(0, 1);
                }
            });
            if ui.button("Reset session").clicked() {
                app.reset_session();
            }

            ui.separator();
            ui.heading("Brush");

            let mut changed = false;
            {
                let settings = app.settings_mut();
                ui.horizontal(|ui| {
                    ui.label("Color:");
                    egui::color_picker::color_edit_button_srgba(
                        ui,
                        &mut settings.line_color,
                        egui::color_picker::Alpha::Opaque,
                    );
                });
                ui.add(egui::Slider::new(&mut settings.line_width, 1.0..=20.0).text("Width"));
                ui.add(
                    egui::Slider::new(&mut settings.distance_from_camera, 0.1..=5.0)
                        .text("Depth"),
                );

                ui.horizontal(|ui| {
                    ui.label("Gate:");
                    changed |= ui
                        .selectable_value(&mut settings.gate_policy, GatePolicy::Latch, "Latch")
                        .changed();
                    changed |= ui
                        .selectable_value(
                            &mut settings.gate_policy,
                            GatePolicy::TrackPlanes,
                            "Track planes",
                        )
                        .changed();
                });
            }
            if changed {
                app.apply_settings();
            }

            let mut show_anchors = app.renderer_mut().show_anchors();
            if ui.checkbox(&mut show_anchors, "Show anchors").changed() {
                app.renderer_mut().set_show_anchors(show_anchors);
            }

            ui.separator();
            ui.heading("Camera");
            ui.add(egui::Slider::new(app.camera_yaw_degrees_mut(), -180.0..=180.0).text("Yaw"));

            ui.separator();
            ui.heading("Sketch");

            ui.horizontal(|ui| {
                let can_undo = app.command_history().can_undo();
                let can_redo = app.command_history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
                if ui.add_enabled(!app.sketch().is_empty(), egui::Button::new("Clear")).clicked() {
                    app.clear_sketch();
                }
            });

            let mut path = app.sketch_path_mut().display().to_string();
            if ui.text_edit_singleline(&mut path).changed() {
                *app.sketch_path_mut() = path.into();
            }
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    app.save_sketch();
                }
                if ui.button("Load").clicked() {
                    app.load_sketch();
                }
            });

            ui.separator();
            ui.label(format!(
                "{} strokes, {} points",
                app.sketch().len(),
                app.sketch().point_count()
            ));
            ui.label(format!(
                "{} drawing, {} anchors",
                app.tracker().active_count(),
                app.anchors().len()
            ));
            if let Some(status) = app.status() {
                ui.label(status);
            }
        });
}
