use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;
use log::error;

use crate::host::{self, Severity};
use crate::platform::NativePlatform;
use crate::remover::CleanupOutcome;
use crate::session::{self, Completion};
use crate::targets::{self, CleanupTarget};
use crate::utils;

/// One cache folder as shown in the window.
struct TargetRow {
    target: CleanupTarget,
    /// `None` until measured, then `Some(None)` when absent.
    size: Option<Option<u64>>,
}

/// A line in the notification strip.
struct Notice {
    message: String,
    severity: Severity,
}

/// What the window is doing right now.
#[derive(PartialEq)]
enum AppPhase {
    Idle,
    Confirming,
    Cleaning,
    /// Counting down to the relaunch.
    Restarting { at: Instant },
    /// Cleanup had errors; asking whether to restart anyway.
    AskRestart,
}

pub struct CleanCacheApp {
    project_dir: PathBuf,
    rows: Vec<TargetRow>,
    phase: AppPhase,
    size_receiver: Option<mpsc::Receiver<Vec<Option<u64>>>>,
    clean_receiver: Option<mpsc::Receiver<CleanupOutcome>>,
    notices: Vec<Notice>,
    confirm_text: String,
    restart_command: Vec<String>,
    restart_delay: Duration,
}

impl CleanCacheApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        project_dir: PathBuf,
        targets: Vec<CleanupTarget>,
        restart_command: Vec<String>,
        restart_delay: Duration,
    ) -> Self {
        let rows = targets
            .into_iter()
            .map(|target| TargetRow { target, size: None })
            .collect();

        let mut app = Self {
            project_dir,
            rows,
            phase: AppPhase::Idle,
            size_receiver: None,
            clean_receiver: None,
            notices: vec![],
            confirm_text: String::new(),
            restart_command,
            restart_delay,
        };
        app.start_measure();
        app
    }

    fn start_measure(&mut self) {
        for row in &mut self.rows {
            row.size = None;
        }
        let targets: Vec<CleanupTarget> = self.rows.iter().map(|r| r.target.clone()).collect();

        let (tx, rx) = mpsc::channel();
        self.size_receiver = Some(rx);

        std::thread::spawn(move || {
            let sizes: Vec<Option<u64>> = targets.iter().map(CleanupTarget::measure).collect();
            let _ = tx.send(sizes);
        });
    }

    fn show_confirm_dialog(&mut self) {
        let sizes: Vec<Option<u64>> = self.rows.iter().map(|r| r.size.flatten()).collect();
        let targets: Vec<CleanupTarget> = self.rows.iter().map(|r| r.target.clone()).collect();
        self.confirm_text = session::confirmation_message(&targets, &sizes);
        self.phase = AppPhase::Confirming;
    }

    fn start_clean(&mut self) {
        self.phase = AppPhase::Cleaning;
        self.notices.clear();
        self.push_notice(session::STARTED_MESSAGE, Severity::Pending);

        let targets: Vec<CleanupTarget> = self.rows.iter().map(|r| r.target.clone()).collect();
        self.clean_receiver = Some(session::spawn_cleanup(
            NativePlatform,
            targets::request_for(&targets),
        ));
    }

    fn push_notice(&mut self, message: &str, severity: Severity) {
        // a pending notice is replaced by whatever follows it
        self.notices.retain(|n| n.severity != Severity::Pending);
        self.notices.push(Notice {
            message: message.to_string(),
            severity,
        });
    }

    fn drain_messages(&mut self) {
        if let Some(ref rx) = self.size_receiver {
            if let Ok(sizes) = rx.try_recv() {
                for (row, size) in self.rows.iter_mut().zip(sizes) {
                    row.size = Some(size);
                }
                self.size_receiver = None;
            }
        }

        let received = match self.clean_receiver {
            Some(ref rx) => match rx.try_recv() {
                Ok(outcome) => Some(Ok(outcome)),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => Some(Err(())),
            },
            None => None,
        };

        match received {
            Some(Ok(outcome)) => {
                self.clean_receiver = None;
                self.on_cleanup_completed(&outcome);
            }
            Some(Err(())) => {
                self.clean_receiver = None;
                self.phase = AppPhase::Idle;
                self.push_notice(
                    "Cleanup worker stopped before reporting a result.",
                    Severity::Failure,
                );
            }
            None => {}
        }
    }

    fn on_cleanup_completed(&mut self, outcome: &CleanupOutcome) {
        let done = session::completion(outcome);
        self.push_notice(&done.message(Some(self.restart_delay)), done.severity());

        self.phase = match done {
            Completion::Restart { .. } => AppPhase::Restarting {
                at: Instant::now() + self.restart_delay,
            },
            Completion::NothingToClean => AppPhase::Idle,
            Completion::Errors { .. } => AppPhase::AskRestart,
        };
        self.start_measure();
    }

    fn restart(&mut self, ctx: &egui::Context) {
        match host::relaunch(&self.restart_command) {
            Ok(()) => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Err(e) => {
                error!("{e}");
                self.phase = AppPhase::Idle;
                self.push_notice(&e.to_string(), Severity::Failure);
            }
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.heading(
                egui::RichText::new("Clean Cache")
                    .size(28.0)
                    .strong()
                    .color(egui::Color32::from_rgb(80, 180, 220)),
            );
            ui.label(
                egui::RichText::new(utils::display_path(&self.project_dir))
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );
        });
        ui.add_space(8.0);
    }

    fn render_action_bar(&mut self, ui: &mut egui::Ui) {
        let is_busy = self.phase != AppPhase::Idle;

        ui.horizontal(|ui| {
            ui.add_space(4.0);

            if ui
                .add_enabled(!is_busy, egui::Button::new("Refresh"))
                .clicked()
            {
                self.start_measure();
            }

            let can_clean = !is_busy && !self.rows.is_empty();
            if ui
                .add_enabled(
                    can_clean,
                    egui::Button::new(
                        egui::RichText::new(session::CONFIRM_TITLE).color(if can_clean {
                            egui::Color32::from_rgb(220, 60, 60)
                        } else {
                            egui::Color32::GRAY
                        }),
                    ),
                )
                .clicked()
            {
                self.show_confirm_dialog();
            }

            if self.phase == AppPhase::Cleaning {
                ui.add_space(8.0);
                ui.spinner();
            }
        });
        ui.add_space(4.0);
    }

    fn render_target_list(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .max_height(220.0)
            .show(ui, |ui| {
                for row in &self.rows {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&row.target.name).strong());
                        ui.label(
                            egui::RichText::new(&row.target.description)
                                .color(egui::Color32::from_rgb(160, 160, 170)),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let (text, color) = match row.size {
                                None => ("...".to_string(), egui::Color32::GRAY),
                                Some(None) => ("not present".to_string(), egui::Color32::GRAY),
                                Some(Some(bytes)) => (
                                    utils::format_size(bytes),
                                    egui::Color32::from_rgb(220, 180, 50),
                                ),
                            };
                            ui.label(egui::RichText::new(text).color(color));
                        });
                    });
                }
            });
    }

    fn render_summary(&self, ui: &mut egui::Ui) {
        let total: u64 = self.rows.iter().filter_map(|r| r.size.flatten()).sum();

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Reclaimable space:").strong());
            ui.label(
                egui::RichText::new(utils::format_size(total))
                    .strong()
                    .size(16.0)
                    .color(egui::Color32::from_rgb(80, 200, 80)),
            );
        });
        ui.add_space(4.0);
    }

    fn render_notices(&self, ui: &mut egui::Ui) {
        for notice in &self.notices {
            let color = match notice.severity {
                Severity::Pending | Severity::Info => egui::Color32::from_rgb(160, 160, 170),
                Severity::Success => egui::Color32::from_rgb(80, 200, 80),
                Severity::Failure => egui::Color32::from_rgb(220, 100, 50),
            };
            ui.horizontal(|ui| {
                ui.add_space(4.0);
                if notice.severity == Severity::Pending {
                    ui.spinner();
                }
                ui.label(egui::RichText::new(&notice.message).color(color));
            });
        }

        if let AppPhase::Restarting { at } = self.phase {
            let left = at.saturating_duration_since(Instant::now()).as_secs() + 1;
            ui.horizontal(|ui| {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("Restarting in {left}s..."))
                        .strong()
                        .color(egui::Color32::from_rgb(80, 180, 220)),
                );
            });
        }
    }

    /// Modal yes/no window. Returns `Some(answer)` once a button is pressed.
    fn render_modal(ctx: &egui::Context, title: &str, text: &str, yes_label: &str) -> Option<bool> {
        let mut answer = None;

        // Dark overlay behind the dialog to block background interaction
        egui::Area::new(egui::Id::new("confirm_overlay"))
            .fixed_pos(egui::Pos2::ZERO)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let screen = ui.ctx().screen_rect();
                ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
            });

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([420.0, 0.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("\u{26A0}")
                            .size(36.0)
                            .color(egui::Color32::from_rgb(220, 180, 50)),
                    );
                });
                ui.add_space(4.0);
                ui.label(text);
                ui.add_space(12.0);

                ui.columns(2, |cols| {
                    cols[0].vertical_centered(|ui| {
                        if ui.add_sized([140.0, 32.0], egui::Button::new("No")).clicked() {
                            answer = Some(false);
                        }
                    });
                    cols[1].vertical_centered(|ui| {
                        if ui
                            .add_sized(
                                [140.0, 32.0],
                                egui::Button::new(
                                    egui::RichText::new(yes_label)
                                        .strong()
                                        .color(egui::Color32::WHITE),
                                )
                                .fill(egui::Color32::from_rgb(200, 50, 50)),
                            )
                            .clicked()
                        {
                            answer = Some(true);
                        }
                    });
                });
                ui.add_space(8.0);
            });

        answer
    }
}

impl eframe::App for CleanCacheApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();

        match self.phase {
            AppPhase::Confirming => {
                match Self::render_modal(ctx, session::CONFIRM_TITLE, &self.confirm_text, "Yes") {
                    Some(true) => self.start_clean(),
                    Some(false) => self.phase = AppPhase::Idle,
                    None => {}
                }
            }
            AppPhase::AskRestart => {
                match Self::render_modal(
                    ctx,
                    "Restart",
                    session::RESTART_ANYWAY_QUESTION,
                    "Restart",
                ) {
                    Some(true) => self.restart(ctx),
                    Some(false) => self.phase = AppPhase::Idle,
                    None => {}
                }
            }
            AppPhase::Restarting { at } if Instant::now() >= at => self.restart(ctx),
            _ => {}
        }

        if self.phase != AppPhase::Idle || self.size_receiver.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            self.render_action_bar(ui);
            ui.separator();
            self.render_target_list(ui);
            ui.separator();
            self.render_summary(ui);
            self.render_notices(ui);
        });
    }
}
