//! Progress reporting for council runs

use colored::Colorize;
use conclave_application::CouncilProgress;
use conclave_domain::Stage;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports council progress with per-stage progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: Stage) -> &'static str {
        match stage {
            Stage::FirstOpinions => "Stage 1: First Opinions",
            Stage::PeerReview => "Stage 2: Peer Review",
            Stage::Synthesis => "Stage 3: Synthesis",
        }
    }

    fn stage_short_name(stage: Stage) -> &'static str {
        match stage {
            Stage::FirstOpinions => "Stage 1",
            Stage::PeerReview => "Stage 2",
            Stage::Synthesis => "Stage 3",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilProgress for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_display_name(stage).to_string());
        pb.set_message("Starting...");

        *self.stage_bar.lock().unwrap() = Some(pb);
    }

    fn on_task_complete(&self, _stage: Stage, responder: &str, success: bool) {
        if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), responder)
            } else {
                format!("{} {}", "x".red(), responder)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        if let Some(pb) = self.stage_bar.lock().unwrap().take() {
            let stage_name = Self::stage_short_name(stage);
            pb.finish_with_message(format!("{} complete!", stage_name.green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CouncilProgress for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        let stage_name = ProgressReporter::stage_display_name(stage);
        println!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage_name.bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: Stage, responder: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), responder);
        } else {
            println!("  {} {} (failed)", "x".red(), responder);
        }
    }

    fn on_stage_complete(&self, _stage: Stage) {
        println!();
    }
}
